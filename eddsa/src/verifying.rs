//! Ed25519 verifying keys.
//!
//! Verification is cofactored: a signature is accepted when
//!
//! ```text
//! [8](S·G − h·A − R) == 0
//! ```
//!
//! so signatures that agree up to a torsion component verify identically.

use core::{
    fmt::{self, Debug},
    hash::{Hash, Hasher},
};

use curve25519_dalek::{
    digest::{generic_array::typenum::U64, Digest},
    edwards::{CompressedEdwardsY, EdwardsPoint},
    montgomery::MontgomeryPoint,
    scalar::Scalar,
    traits::IsIdentity,
};
use signature::{DigestVerifier, Verifier};

use crate::{
    challenge::{self, CONTEXT_FLAG, PREHASH_FLAG},
    signing::decode_tweak,
    Context, Error, ExpandedSecretKey, Signature, SigningKey, PUBLIC_KEY_LENGTH,
};

#[cfg(feature = "pkcs8")]
use ed25519::pkcs8::PublicKeyBytes;
#[cfg(all(feature = "alloc", feature = "pkcs8"))]
use pkcs8::EncodePublicKey;

/// Ed25519 verifying key.
///
/// Carries the compressed encoding alongside the decompressed point so that
/// verification never re-does the decompression.
#[derive(Copy, Clone)]
pub struct VerifyingKey {
    pub(crate) compressed: CompressedEdwardsY,
    pub(crate) point: EdwardsPoint,
}

impl VerifyingKey {
    /// Parse a verifying key from its compressed Edwards encoding.
    ///
    /// Rejects encodings that do not decompress onto the curve, and keys
    /// that encode the identity point.
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_LENGTH]) -> Result<Self, Error> {
        let compressed = CompressedEdwardsY(*bytes);
        let point = compressed.decompress().ok_or(Error::InvalidPublicKey)?;

        if point.is_identity() {
            return Err(Error::IdentityPoint);
        }

        Ok(Self { compressed, point })
    }

    /// Serialize the compressed encoding.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.compressed.to_bytes()
    }

    /// Borrow the compressed encoding.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        self.compressed.as_bytes()
    }

    /// Build the verifying key for a raw signing scalar.
    ///
    /// The scalar bytes are reduced mod the group order, so this agrees
    /// with the key material a tweaked signing key carries.
    pub fn from_scalar_bytes(scalar_bytes: &[u8; 32]) -> Result<Self, Error> {
        let point = EdwardsPoint::mul_base(&Scalar::from_bytes_mod_order(*scalar_bytes));

        if point.is_identity() {
            return Err(Error::IdentityPoint);
        }

        Ok(Self::from_point(point))
    }

    /// Create an Ed25519ctx view of this key for use with the [`Verifier`]
    /// and [`DigestVerifier`] traits.
    pub fn with_context<'k, 'v>(
        &'k self,
        context: &'v [u8],
    ) -> Result<Context<'k, 'v, Self>, Error> {
        Context::new(self, context)
    }

    /// Verify a signature in Ed25519ctx mode.
    pub fn verify_ctx(
        &self,
        context: &[u8],
        message: &[u8],
        signature: &Signature,
    ) -> Result<(), signature::Error> {
        self.verify_inner(signature, Some(CONTEXT_FLAG), context, message)
    }

    /// Verify a signature over an already-hashed message in Ed25519ph mode.
    pub fn verify_prehashed<D>(
        &self,
        prehashed_message: D,
        context: Option<&[u8]>,
        signature: &Signature,
    ) -> Result<(), signature::Error>
    where
        D: Digest<OutputSize = U64>,
    {
        let mut prehash = [0u8; 64];
        prehash.copy_from_slice(prehashed_message.finalize().as_slice());

        self.verify_inner(
            signature,
            Some(PREHASH_FLAG),
            context.unwrap_or_default(),
            &prehash,
        )
    }

    /// Add `tweak`·G to this key.
    ///
    /// The result is the verifying key of a signing key tweaked with the
    /// same value. Errors if the sum is the identity point.
    pub fn tweak_add(&self, tweak: &[u8; 32]) -> Result<Self, Error> {
        let t = decode_tweak(tweak)?;
        let point = self.point + EdwardsPoint::mul_base(&t);

        if point.is_identity() {
            return Err(Error::IdentityPoint);
        }

        Ok(Self::from_point(point))
    }

    /// Multiply this key by a tweak.
    pub fn tweak_mul(&self, tweak: &[u8; 32]) -> Result<Self, Error> {
        let t = decode_tweak(tweak)?;
        let point = self.point * t;

        if point.is_identity() {
            return Err(Error::IdentityPoint);
        }

        Ok(Self::from_point(point))
    }

    /// Convert to the birationally equivalent Montgomery u-coordinate.
    ///
    /// The sign of the Edwards x-coordinate is not carried by the
    /// u-coordinate; read it from bit 255 of [`VerifyingKey::as_bytes`]
    /// before round-tripping.
    pub fn to_montgomery(&self) -> MontgomeryPoint {
        self.point.to_montgomery()
    }

    /// Rebuild a verifying key from a Montgomery u-coordinate and the sign
    /// of the Edwards x-coordinate.
    pub fn from_montgomery(u: &MontgomeryPoint, sign: bool) -> Result<Self, Error> {
        let point = u.to_edwards(sign as u8).ok_or(Error::InvalidPublicKey)?;

        if point.is_identity() {
            return Err(Error::IdentityPoint);
        }

        Ok(Self::from_point(point))
    }

    pub(crate) fn from_point(point: EdwardsPoint) -> Self {
        Self {
            compressed: point.compress(),
            point,
        }
    }

    fn verify_inner(
        &self,
        signature: &Signature,
        phflag: Option<u8>,
        context: &[u8],
        message: &[u8],
    ) -> Result<(), signature::Error> {
        let big_r = CompressedEdwardsY(*signature.r_bytes())
            .decompress()
            .ok_or_else(signature::Error::new)?;
        let s: Scalar = Option::from(Scalar::from_canonical_bytes(*signature.s_bytes()))
            .ok_or_else(signature::Error::new)?;

        // The challenge binds the R bytes as transmitted, not re-encoded.
        let h = challenge::hash_to_scalar(
            phflag,
            context,
            &[signature.r_bytes(), self.as_bytes(), message],
        )?;

        let minus_a = -self.point;
        let recomputed = EdwardsPoint::vartime_double_scalar_mul_basepoint(&h, &minus_a, &s);

        if ((recomputed - big_r).mul_by_cofactor()).is_identity() {
            Ok(())
        } else {
            Err(signature::Error::new())
        }
    }
}

//
// `*Verifier` trait impls
//

impl Verifier<Signature> for VerifyingKey {
    fn verify(&self, msg: &[u8], signature: &Signature) -> signature::Result<()> {
        self.verify_inner(signature, None, &[], msg)
    }
}

impl<D> DigestVerifier<D, Signature> for VerifyingKey
where
    D: Digest<OutputSize = U64>,
{
    fn verify_digest(&self, msg_digest: D, signature: &Signature) -> signature::Result<()> {
        self.verify_prehashed(msg_digest, None, signature)
    }
}

impl Verifier<Signature> for Context<'_, '_, VerifyingKey> {
    fn verify(&self, msg: &[u8], signature: &Signature) -> signature::Result<()> {
        self.key
            .verify_inner(signature, Some(CONTEXT_FLAG), self.value, msg)
    }
}

impl<D> DigestVerifier<D, Signature> for Context<'_, '_, VerifyingKey>
where
    D: Digest<OutputSize = U64>,
{
    fn verify_digest(&self, msg_digest: D, signature: &Signature) -> signature::Result<()> {
        self.key
            .verify_prehashed(msg_digest, Some(self.value), signature)
    }
}

//
// Other trait impls
//

impl AsRef<[u8]> for VerifyingKey {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Debug for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VerifyingKey({:?})", self.compressed)
    }
}

impl Eq for VerifyingKey {}

impl PartialEq for VerifyingKey {
    fn eq(&self, other: &Self) -> bool {
        self.compressed == other.compressed
    }
}

impl Hash for VerifyingKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.compressed.as_bytes().hash(state)
    }
}

impl From<&SigningKey> for VerifyingKey {
    fn from(signing_key: &SigningKey) -> VerifyingKey {
        signing_key.verifying_key()
    }
}

impl From<&ExpandedSecretKey> for VerifyingKey {
    fn from(expanded: &ExpandedSecretKey) -> VerifyingKey {
        VerifyingKey::from_point(EdwardsPoint::mul_base(&expanded.scalar))
    }
}

impl TryFrom<&[u8]> for VerifyingKey {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Error> {
        let bytes =
            <[u8; PUBLIC_KEY_LENGTH]>::try_from(bytes).map_err(|_| Error::InvalidPublicKey)?;
        Self::from_bytes(&bytes)
    }
}

//
// PKCS#8 (RFC 8410)
//

#[cfg(feature = "pkcs8")]
impl TryFrom<PublicKeyBytes> for VerifyingKey {
    type Error = pkcs8::spki::Error;

    fn try_from(pkcs8_key: PublicKeyBytes) -> pkcs8::spki::Result<Self> {
        VerifyingKey::try_from(&pkcs8_key)
    }
}

#[cfg(feature = "pkcs8")]
impl TryFrom<&PublicKeyBytes> for VerifyingKey {
    type Error = pkcs8::spki::Error;

    fn try_from(pkcs8_key: &PublicKeyBytes) -> pkcs8::spki::Result<Self> {
        VerifyingKey::from_bytes(&pkcs8_key.0).map_err(|_| pkcs8::spki::Error::KeyMalformed)
    }
}

#[cfg(feature = "pkcs8")]
impl From<VerifyingKey> for PublicKeyBytes {
    fn from(verifying_key: VerifyingKey) -> PublicKeyBytes {
        PublicKeyBytes(verifying_key.to_bytes())
    }
}

#[cfg(feature = "pkcs8")]
impl From<&VerifyingKey> for PublicKeyBytes {
    fn from(verifying_key: &VerifyingKey) -> PublicKeyBytes {
        PublicKeyBytes(verifying_key.to_bytes())
    }
}

#[cfg(feature = "pkcs8")]
impl TryFrom<pkcs8::SubjectPublicKeyInfoRef<'_>> for VerifyingKey {
    type Error = pkcs8::spki::Error;

    fn try_from(public_key: pkcs8::SubjectPublicKeyInfoRef<'_>) -> pkcs8::spki::Result<Self> {
        PublicKeyBytes::try_from(public_key)?.try_into()
    }
}

#[cfg(all(feature = "alloc", feature = "pkcs8"))]
impl EncodePublicKey for VerifyingKey {
    fn to_public_key_der(&self) -> pkcs8::spki::Result<pkcs8::Document> {
        PublicKeyBytes::from(self).to_public_key_der()
    }
}
