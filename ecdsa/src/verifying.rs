//! ECDSA verification.

use crate::{
    decode_tweak, reduce_prehash, EcdsaCurve, Error, Signature, SignatureSize, SigningKey,
};
use elliptic_curve::{
    generic_array::ArrayLength,
    group::{Curve as _, Group},
    ops::{Invert, LinearCombination, MulByGenerator, Reduce},
    point::AffineCoordinates,
    sec1::{EncodedPoint, FromEncodedPoint, ModulusSize, ToEncodedPoint},
    AffinePoint, FieldBytes, FieldBytesSize, NonZeroScalar, ProjectivePoint, PublicKey, Scalar,
};
use signature::{digest::Digest, hazmat::PrehashVerifier, DigestVerifier, Verifier};

#[cfg(feature = "alloc")]
use {alloc::boxed::Box, elliptic_curve::point::PointCompression};

#[cfg(feature = "pkcs8")]
use elliptic_curve::pkcs8::{self, AssociatedOid};

#[cfg(all(feature = "alloc", feature = "pkcs8"))]
use elliptic_curve::pkcs8::EncodePublicKey;

#[cfg(feature = "jwk")]
use {
    alloc::string::String,
    elliptic_curve::{JwkEcKey, JwkParameters},
};

/// ECDSA public key used for verifying signatures.
///
/// Wraps a validated, non-identity curve point. Signature checks run through
/// the [`Verifier`] and [`PrehashVerifier`] traits; both report failures as
/// the opaque [`signature::Error`], never as a panic or a typed reason.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VerifyingKey<C>
where
    C: EcdsaCurve,
{
    pub(crate) inner: PublicKey<C>,
}

impl<C> VerifyingKey<C>
where
    C: EcdsaCurve,
{
    /// Compute the verifying key for a secret scalar.
    pub(crate) fn from_secret_scalar(secret_scalar: &NonZeroScalar<C>) -> Self {
        Self {
            inner: PublicKey::from_secret_scalar(secret_scalar),
        }
    }

    /// Create a verifying key from an affine point.
    ///
    /// Returns [`Error::IdentityPoint`] if the point is the identity.
    pub fn from_affine(affine: AffinePoint<C>) -> Result<Self, Error> {
        PublicKey::from_affine(affine)
            .map(|inner| Self { inner })
            .map_err(|_| Error::IdentityPoint)
    }

    /// Borrow the inner [`AffinePoint`] for this public key.
    pub fn as_affine(&self) -> &AffinePoint<C> {
        self.inner.as_affine()
    }

    /// Add `tweak · G` to this key, returning the derived verifying key.
    ///
    /// Matches [`SigningKey::tweak_add`] on the secret side: tweaking a
    /// secret key and deriving its public key commutes with tweaking the
    /// public key directly.
    pub fn tweak_add(&self, tweak: &FieldBytes<C>) -> Result<Self, Error> {
        let t = decode_tweak::<C>(tweak)?;
        let tweaked = ProjectivePoint::<C>::from(*self.as_affine())
            + ProjectivePoint::<C>::mul_by_generator(&t);

        PublicKey::from_affine(tweaked.to_affine())
            .map(|inner| Self { inner })
            .map_err(|_| Error::IdentityPoint)
    }

    /// Multiply this key by a tweak scalar, returning the derived verifying
    /// key.
    pub fn tweak_mul(&self, tweak: &FieldBytes<C>) -> Result<Self, Error> {
        let t = decode_tweak::<C>(tweak)?;
        let tweaked = ProjectivePoint::<C>::from(*self.as_affine()) * t;

        PublicKey::from_affine(tweaked.to_affine())
            .map(|inner| Self { inner })
            .map_err(|_| Error::IdentityPoint)
    }
}

impl<C> VerifyingKey<C>
where
    C: EcdsaCurve,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    /// Parse a verifying key from a SEC1-encoded point (compressed,
    /// uncompressed, or hybrid).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, Error> {
        PublicKey::from_sec1_bytes(bytes)
            .map(|inner| Self { inner })
            .map_err(|_| Error::InvalidPublicKey)
    }

    /// Serialize this key as a SEC1 [`EncodedPoint`], optionally compressed.
    pub fn to_encoded_point(&self, compress: bool) -> EncodedPoint<C> {
        self.inner.to_encoded_point(compress)
    }

    /// Serialize this key as SEC1-encoded bytes with point compression.
    #[cfg(feature = "alloc")]
    pub fn to_sec1_bytes(&self) -> Box<[u8]>
    where
        C: PointCompression,
    {
        self.inner.to_sec1_bytes()
    }
}

//
// `*Verifier` trait impls
//

impl<C> PrehashVerifier<Signature<C>> for VerifyingKey<C>
where
    C: EcdsaCurve,
    SignatureSize<C>: ArrayLength<u8>,
{
    fn verify_prehash(&self, prehash: &[u8], signature: &Signature<C>) -> signature::Result<()> {
        let z = reduce_prehash::<C>(prehash)?;
        let (r, s) = signature.split_scalars();
        let s_inv = *s.invert();
        let u1 = z * s_inv;
        let u2 = *r * s_inv;

        let x = ProjectivePoint::<C>::lincomb(
            &ProjectivePoint::<C>::generator(),
            &u1,
            &ProjectivePoint::<C>::from(*self.as_affine()),
            &u2,
        )
        .to_affine()
        .x();

        if *r == <Scalar<C> as Reduce<C::Uint>>::reduce_bytes(&x) {
            Ok(())
        } else {
            Err(signature::Error::new())
        }
    }
}

impl<C, D> DigestVerifier<D, Signature<C>> for VerifyingKey<C>
where
    C: EcdsaCurve,
    D: Digest,
    SignatureSize<C>: ArrayLength<u8>,
{
    fn verify_digest(&self, digest: D, signature: &Signature<C>) -> signature::Result<()> {
        self.verify_prehash(&digest.finalize(), signature)
    }
}

impl<C> Verifier<Signature<C>> for VerifyingKey<C>
where
    C: EcdsaCurve,
    SignatureSize<C>: ArrayLength<u8>,
{
    fn verify(&self, msg: &[u8], signature: &Signature<C>) -> signature::Result<()> {
        self.verify_digest(C::Digest::new_with_prefix(msg), signature)
    }
}

//
// Other trait impls
//

impl<C> AsRef<AffinePoint<C>> for VerifyingKey<C>
where
    C: EcdsaCurve,
{
    fn as_ref(&self) -> &AffinePoint<C> {
        self.as_affine()
    }
}

impl<C> From<SigningKey<C>> for VerifyingKey<C>
where
    C: EcdsaCurve,
{
    fn from(signing_key: SigningKey<C>) -> Self {
        *signing_key.verifying_key()
    }
}

impl<C> From<&SigningKey<C>> for VerifyingKey<C>
where
    C: EcdsaCurve,
{
    fn from(signing_key: &SigningKey<C>) -> Self {
        *signing_key.verifying_key()
    }
}

impl<C> From<PublicKey<C>> for VerifyingKey<C>
where
    C: EcdsaCurve,
{
    fn from(public_key: PublicKey<C>) -> Self {
        Self { inner: public_key }
    }
}

impl<C> From<VerifyingKey<C>> for PublicKey<C>
where
    C: EcdsaCurve,
{
    fn from(verifying_key: VerifyingKey<C>) -> Self {
        verifying_key.inner
    }
}

impl<C> From<&VerifyingKey<C>> for PublicKey<C>
where
    C: EcdsaCurve,
{
    fn from(verifying_key: &VerifyingKey<C>) -> Self {
        verifying_key.inner
    }
}

//
// SPKI and JWK key containers, delegated through [`PublicKey`]
//

#[cfg(feature = "pkcs8")]
impl<C> TryFrom<pkcs8::SubjectPublicKeyInfoRef<'_>> for VerifyingKey<C>
where
    C: EcdsaCurve + AssociatedOid,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    type Error = pkcs8::spki::Error;

    fn try_from(spki: pkcs8::SubjectPublicKeyInfoRef<'_>) -> pkcs8::spki::Result<Self> {
        PublicKey::try_from(spki).map(|inner| Self { inner })
    }
}

#[cfg(all(feature = "alloc", feature = "pkcs8"))]
impl<C> EncodePublicKey for VerifyingKey<C>
where
    C: EcdsaCurve + AssociatedOid,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    fn to_public_key_der(&self) -> pkcs8::spki::Result<pkcs8::Document> {
        self.inner.to_public_key_der()
    }
}

#[cfg(feature = "jwk")]
impl<C> VerifyingKey<C>
where
    C: EcdsaCurve + JwkParameters,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    /// Parse a verifying key from a JWK.
    pub fn from_jwk(jwk: &JwkEcKey) -> Result<Self, Error> {
        PublicKey::from_jwk(jwk)
            .map(|inner| Self { inner })
            .map_err(|_| Error::InvalidPublicKey)
    }

    /// Parse a verifying key from a JWK string.
    pub fn from_jwk_str(jwk: &str) -> Result<Self, Error> {
        PublicKey::from_jwk_str(jwk)
            .map(|inner| Self { inner })
            .map_err(|_| Error::InvalidPublicKey)
    }

    /// Serialize this verifying key as a JWK.
    pub fn to_jwk(&self) -> JwkEcKey {
        self.inner.to_jwk()
    }

    /// Serialize this verifying key as a JWK string.
    pub fn to_jwk_string(&self) -> String {
        self.inner.to_jwk_string()
    }
}
