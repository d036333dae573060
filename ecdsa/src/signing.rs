//! ECDSA signing with deterministic nonces and a blinded secret path.
//!
//! ## Algorithm
//!
//! ```text
//! 1. z = truncate(prehash) mod n
//! 2. seed an HMAC DRBG with (secret key, z)
//! 3. draw k from the DRBG; retry unless 1 < k < n-1
//! 4. R = [k]G; r = R.x mod n; retry if r = 0
//! 5. draw a fresh random blinding scalar b
//! 6. s = (b·a·r + b·z) · k⁻¹ · b⁻¹ mod n; retry if s = 0
//! 7. if s > n/2, set s = n - s (low-S form)
//! ```
//!
//! The nonce is a function of the key and message only, so signatures are
//! reproducible; the blinding factor decorrelates the secret-scalar
//! arithmetic from observable timing and power without changing the result.

use crate::{
    decode_tweak, reduce_prehash, truncate_high_bits, EcdsaCurve, Error, RecoveryId, Signature,
    SignatureSize, VerifyingKey,
};
use core::fmt::{self, Debug};
use elliptic_curve::{
    generic_array::ArrayLength,
    group::Curve as _,
    ops::{Invert, MulByGenerator, Reduce},
    point::AffineCoordinates,
    scalar::IsHigh,
    subtle::{Choice, ConditionallySelectable, ConstantTimeEq},
    zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing},
    Field, FieldBytes, NonZeroScalar, PrimeField, ProjectivePoint, Scalar, SecretKey,
};
use rfc6979::HmacDrbg;
use signature::{
    digest::Digest,
    hazmat::RandomizedPrehashSigner,
    rand_core::CryptoRngCore,
    KeypairRef, RandomizedDigestSigner, RandomizedSigner,
};

#[cfg(any(feature = "jwk", feature = "pkcs8"))]
use elliptic_curve::{
    sec1::{FromEncodedPoint, ModulusSize, ToEncodedPoint},
    AffinePoint, FieldBytesSize,
};

#[cfg(feature = "pkcs8")]
use elliptic_curve::pkcs8::{self, AssociatedOid};

#[cfg(all(feature = "alloc", feature = "pkcs8"))]
use elliptic_curve::pkcs8::{EncodePrivateKey, SecretDocument};

#[cfg(feature = "jwk")]
use {
    alloc::string::String,
    elliptic_curve::{JwkEcKey, JwkParameters},
};

/// ECDSA secret key used for signing messages and deriving tweaked keys.
///
/// ## Usage
///
/// Signing always takes an explicit RNG, so the primary API is the
/// randomized half of the [`signature`] traits:
///
/// - [`RandomizedSigner`]: hash a message with the curve digest, then sign
/// - [`RandomizedPrehashSigner`]: sign the raw output bytes of a digest
///
/// The RNG drives scalar blinding only. Nonces are derived per RFC 6979,
/// so two signatures over the same message with different RNGs are equal.
#[derive(Clone)]
pub struct SigningKey<C>
where
    C: EcdsaCurve,
{
    /// Secret scalar; nonzero and canonical by construction.
    secret_scalar: NonZeroScalar<C>,

    /// Verifying key for this signing key.
    verifying_key: VerifyingKey<C>,
}

impl<C> SigningKey<C>
where
    C: EcdsaCurve,
{
    /// Generate a signing key, rejection-sampling the secret scalar from
    /// `[1, n-1]`.
    pub fn random(rng: &mut impl CryptoRngCore) -> Self {
        Self::from_nonzero_scalar(NonZeroScalar::random(rng))
    }

    /// Parse a signing key from big endian-encoded bytes.
    ///
    /// Returns [`Error::InvalidSecretKey`] if the value is zero or not below
    /// the curve order.
    pub fn from_bytes(bytes: &FieldBytes<C>) -> Result<Self, Error> {
        Option::from(NonZeroScalar::from_repr(bytes.clone()))
            .map(Self::from_nonzero_scalar)
            .ok_or(Error::InvalidSecretKey)
    }

    /// Parse a signing key from a big endian-encoded byte slice.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        NonZeroScalar::try_from(bytes)
            .map(Self::from_nonzero_scalar)
            .map_err(|_| Error::InvalidSecretKey)
    }

    /// Create a signing key from a nonzero secret scalar.
    pub fn from_nonzero_scalar(secret_scalar: NonZeroScalar<C>) -> Self {
        let verifying_key = VerifyingKey::from_secret_scalar(&secret_scalar);

        Self {
            secret_scalar,
            verifying_key,
        }
    }

    /// Serialize as big endian-encoded bytes.
    pub fn to_bytes(&self) -> FieldBytes<C> {
        self.secret_scalar.to_repr()
    }

    /// Borrow the secret [`NonZeroScalar`] value for this key.
    ///
    /// # ⚠️ Warning
    ///
    /// This value is key material.
    ///
    /// Please treat it with the care it deserves!
    pub fn as_nonzero_scalar(&self) -> &NonZeroScalar<C> {
        &self.secret_scalar
    }

    /// Get the [`VerifyingKey`] which corresponds to this [`SigningKey`].
    pub fn verifying_key(&self) -> &VerifyingKey<C> {
        &self.verifying_key
    }

    /// Add a tweak scalar to this key, returning the derived signing key.
    ///
    /// The tweak must be canonical for the curve order; the result must not
    /// be the zero scalar.
    pub fn tweak_add(&self, tweak: &FieldBytes<C>) -> Result<Self, Error> {
        let t = decode_tweak::<C>(tweak)?;
        let d = *self.secret_scalar + t;

        Option::from(NonZeroScalar::new(d))
            .map(Self::from_nonzero_scalar)
            .ok_or(Error::ZeroScalar)
    }

    /// Multiply this key by a tweak scalar, returning the derived signing
    /// key.
    pub fn tweak_mul(&self, tweak: &FieldBytes<C>) -> Result<Self, Error> {
        let t = decode_tweak::<C>(tweak)?;
        let d = *self.secret_scalar * t;

        Option::from(NonZeroScalar::new(d))
            .map(Self::from_nonzero_scalar)
            .ok_or(Error::ZeroScalar)
    }
}

impl<C> SigningKey<C>
where
    C: EcdsaCurve,
    SignatureSize<C>: ArrayLength<u8>,
{
    /// Deterministic-nonce signing with a blinded secret path.
    ///
    /// Returns the signature together with the parity/reduction flags needed
    /// for public-key recovery.
    pub(crate) fn sign_prehash_blinded(
        &self,
        rng: &mut impl CryptoRngCore,
        prehash: &[u8],
    ) -> Result<(Signature<C>, RecoveryId), Error> {
        let z = reduce_prehash::<C>(prehash)?;
        let entropy = Zeroizing::new(self.secret_scalar.to_repr());
        let mut hmac_drbg = HmacDrbg::<C::Digest>::new(&entropy, &z.to_repr(), &[]);
        let mut k_bytes = Zeroizing::new(FieldBytes::<C>::default());

        loop {
            hmac_drbg.fill_bytes(&mut k_bytes);
            truncate_high_bits::<C>(&mut k_bytes);

            let k = match Option::<NonZeroScalar<C>>::from(NonZeroScalar::from_repr(
                FieldBytes::<C>::clone(&k_bytes),
            )) {
                Some(k) => Zeroizing::new(k),
                None => continue,
            };

            // nonce domain is 1 < k < n - 1
            let k_at_edge = (**k).ct_eq(&Scalar::<C>::ONE) | (**k).ct_eq(&(-Scalar::<C>::ONE));
            if bool::from(k_at_edge) {
                continue;
            }

            let big_r = ProjectivePoint::<C>::mul_by_generator(&k).to_affine();
            let x = big_r.x();
            let r = <Scalar<C> as Reduce<C::Uint>>::reduce_bytes(&x);

            if r.is_zero().into() {
                continue;
            }

            let x_is_reduced = r.to_repr() != x;
            let mut y_is_odd = big_r.y_is_odd();

            // Blind the secret scalar before it meets the nonce inverse.
            let b = Zeroizing::new(NonZeroScalar::<C>::random(rng));
            let b_inv = Zeroizing::new(b.invert());
            let k_inv = Zeroizing::new(k.invert());

            let s = (**b * *self.secret_scalar * r + **b * z) * **k_inv * **b_inv;

            if s.is_zero().into() {
                continue;
            }

            // canonical low-S form; flipping s mirrors R over the x-axis
            let s_high = s.is_high();
            let s = Scalar::<C>::conditional_select(&s, &(-s), s_high);
            y_is_odd ^= s_high;

            let signature = Signature {
                r: r.into(),
                s: s.into(),
            };

            return Ok((signature, RecoveryId::new(y_is_odd.into(), x_is_reduced)));
        }
    }
}

//
// `*Signer` trait impls
//

impl<C> RandomizedPrehashSigner<Signature<C>> for SigningKey<C>
where
    C: EcdsaCurve,
    SignatureSize<C>: ArrayLength<u8>,
{
    fn sign_prehash_with_rng(
        &self,
        rng: &mut impl CryptoRngCore,
        prehash: &[u8],
    ) -> signature::Result<Signature<C>> {
        self.sign_prehash_blinded(rng, prehash)
            .map(|(signature, _)| signature)
            .map_err(Into::into)
    }
}

impl<C, D> RandomizedDigestSigner<D, Signature<C>> for SigningKey<C>
where
    C: EcdsaCurve,
    D: Digest,
    SignatureSize<C>: ArrayLength<u8>,
{
    fn try_sign_digest_with_rng(
        &self,
        rng: &mut impl CryptoRngCore,
        digest: D,
    ) -> signature::Result<Signature<C>> {
        self.sign_prehash_with_rng(rng, &digest.finalize())
    }
}

impl<C> RandomizedSigner<Signature<C>> for SigningKey<C>
where
    C: EcdsaCurve,
    SignatureSize<C>: ArrayLength<u8>,
{
    fn try_sign_with_rng(
        &self,
        rng: &mut impl CryptoRngCore,
        msg: &[u8],
    ) -> signature::Result<Signature<C>> {
        self.try_sign_digest_with_rng(rng, C::Digest::new_with_prefix(msg))
    }
}

//
// Other trait impls
//

impl<C> AsRef<VerifyingKey<C>> for SigningKey<C>
where
    C: EcdsaCurve,
{
    fn as_ref(&self) -> &VerifyingKey<C> {
        &self.verifying_key
    }
}

impl<C> ConstantTimeEq for SigningKey<C>
where
    C: EcdsaCurve,
{
    fn ct_eq(&self, other: &Self) -> Choice {
        (*self.secret_scalar).ct_eq(&other.secret_scalar)
    }
}

impl<C> Debug for SigningKey<C>
where
    C: EcdsaCurve,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("verifying_key", &self.verifying_key)
            .finish_non_exhaustive()
    }
}

impl<C> Drop for SigningKey<C>
where
    C: EcdsaCurve,
{
    fn drop(&mut self) {
        self.secret_scalar.zeroize();
    }
}

/// Constant-time comparison
impl<C> Eq for SigningKey<C> where C: EcdsaCurve {}
impl<C> PartialEq for SigningKey<C>
where
    C: EcdsaCurve,
{
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl<C> From<NonZeroScalar<C>> for SigningKey<C>
where
    C: EcdsaCurve,
{
    fn from(secret_scalar: NonZeroScalar<C>) -> Self {
        Self::from_nonzero_scalar(secret_scalar)
    }
}

impl<C> From<SecretKey<C>> for SigningKey<C>
where
    C: EcdsaCurve,
{
    fn from(secret_key: SecretKey<C>) -> Self {
        Self::from(&secret_key)
    }
}

impl<C> From<&SecretKey<C>> for SigningKey<C>
where
    C: EcdsaCurve,
{
    fn from(secret_key: &SecretKey<C>) -> Self {
        Self::from_nonzero_scalar(secret_key.to_nonzero_scalar())
    }
}

impl<C> From<SigningKey<C>> for SecretKey<C>
where
    C: EcdsaCurve,
{
    fn from(signing_key: SigningKey<C>) -> Self {
        Self::from(&signing_key)
    }
}

impl<C> From<&SigningKey<C>> for SecretKey<C>
where
    C: EcdsaCurve,
{
    fn from(signing_key: &SigningKey<C>) -> Self {
        Self::from(signing_key.secret_scalar)
    }
}

impl<C> KeypairRef for SigningKey<C>
where
    C: EcdsaCurve,
{
    type VerifyingKey = VerifyingKey<C>;
}

impl<C> TryFrom<&[u8]> for SigningKey<C>
where
    C: EcdsaCurve,
{
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_slice(bytes)
    }
}

impl<C> ZeroizeOnDrop for SigningKey<C> where C: EcdsaCurve {}

//
// PKCS#8 and JWK key containers, delegated through [`SecretKey`]
//

#[cfg(feature = "pkcs8")]
impl<C> TryFrom<pkcs8::PrivateKeyInfo<'_>> for SigningKey<C>
where
    C: EcdsaCurve + AssociatedOid,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    type Error = pkcs8::Error;

    fn try_from(private_key_info: pkcs8::PrivateKeyInfo<'_>) -> pkcs8::Result<Self> {
        SecretKey::try_from(private_key_info).map(Into::into)
    }
}

#[cfg(all(feature = "alloc", feature = "pkcs8"))]
impl<C> EncodePrivateKey for SigningKey<C>
where
    C: EcdsaCurve + AssociatedOid,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    fn to_pkcs8_der(&self) -> pkcs8::Result<SecretDocument> {
        SecretKey::from(self).to_pkcs8_der()
    }
}

#[cfg(feature = "jwk")]
impl<C> SigningKey<C>
where
    C: EcdsaCurve + JwkParameters,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    /// Parse a signing key from a JWK.
    pub fn from_jwk(jwk: &JwkEcKey) -> Result<Self, Error> {
        SecretKey::from_jwk(jwk)
            .map(Into::into)
            .map_err(|_| Error::InvalidSecretKey)
    }

    /// Parse a signing key from a JWK string.
    pub fn from_jwk_str(jwk: &str) -> Result<Self, Error> {
        SecretKey::from_jwk_str(jwk)
            .map(Into::into)
            .map_err(|_| Error::InvalidSecretKey)
    }

    /// Serialize this signing key as a JWK.
    pub fn to_jwk(&self) -> JwkEcKey {
        SecretKey::from(self).to_jwk()
    }

    /// Serialize this signing key as a JWK string.
    pub fn to_jwk_string(&self) -> Zeroizing<String> {
        SecretKey::from(self).to_jwk_string()
    }
}

#[cfg(all(test, feature = "p256"))]
mod tests {
    use super::{SigningKey, ZeroizeOnDrop};
    use p256::NistP256;

    #[test]
    fn signing_key_zeroizes_on_drop() {
        fn assert_zeroize_on_drop<T: ZeroizeOnDrop>() {}
        assert_zeroize_on_drop::<SigningKey<NistP256>>();
    }
}
