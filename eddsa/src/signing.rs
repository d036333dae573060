//! Ed25519 signing keys.
//!
//! ```text
//! expand:    (a, prefix) = SHA-512(seed), low half clamped into a
//! nonce:     r = H(dom2? ‖ prefix ‖ M) mod n
//! commit:    R = r·G
//! challenge: h = H(dom2? ‖ R ‖ A ‖ M) mod n
//! blind:     S = (r·b + h·b·a) · b⁻¹ mod n, fresh random b
//! output:    R ‖ S
//! ```

use core::fmt::{self, Debug};

use curve25519_dalek::{
    digest::{generic_array::typenum::U64, Digest},
    edwards::EdwardsPoint,
    scalar::{clamp_integer, Scalar},
    traits::IsIdentity,
};
use rand_core::CryptoRngCore;
use sha2::Sha512;
use signature::{KeypairRef, RandomizedDigestSigner, RandomizedSigner};
use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{
    challenge::{self, CONTEXT_FLAG, PREHASH_FLAG},
    Context, Error, SecretKey, Signature, VerifyingKey,
};

#[cfg(feature = "pkcs8")]
use ed25519::pkcs8::{KeypairBytes, PublicKeyBytes};
#[cfg(all(feature = "alloc", feature = "pkcs8"))]
use pkcs8::{EncodePrivateKey, SecretDocument};

/// Ed25519 signing key.
///
/// Holds the 32-byte secret seed together with the public key derived from
/// it, so repeated signing does not pay for the basepoint multiplication
/// twice.
#[derive(Clone)]
pub struct SigningKey {
    seed: SecretKey,
    verifying_key: VerifyingKey,
}

impl SigningKey {
    /// Generate a signing key from a cryptographically secure RNG.
    pub fn generate(rng: &mut impl CryptoRngCore) -> Self {
        let mut seed = SecretKey::default();
        rng.fill_bytes(&mut seed);
        Self::from_bytes(&seed)
    }

    /// Build a signing key from a seed.
    ///
    /// Every 32-byte string is a valid seed; the signing scalar is obtained
    /// by hashing and clamping, never from the seed bytes directly.
    pub fn from_bytes(seed: &SecretKey) -> Self {
        let verifying_key = VerifyingKey::from(&ExpandedSecretKey::from(seed));

        Self {
            seed: *seed,
            verifying_key,
        }
    }

    /// Serialize the seed.
    pub fn to_bytes(&self) -> SecretKey {
        self.seed
    }

    /// Borrow the seed.
    pub fn as_bytes(&self) -> &SecretKey {
        &self.seed
    }

    /// Get the verifying key for this signing key.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.verifying_key
    }

    /// Clamped signing scalar bytes derived from the seed.
    ///
    /// # ⚠️ Warning
    ///
    /// This output is key material: anyone holding it can sign on behalf of
    /// this key.
    pub fn to_scalar_bytes(&self) -> [u8; 32] {
        let mut hash = Sha512::digest(self.seed);
        let mut scalar_bytes = [0u8; 32];
        scalar_bytes.copy_from_slice(&hash[..32]);
        hash.as_mut_slice().zeroize();

        let clamped = clamp_integer(scalar_bytes);
        scalar_bytes.zeroize();
        clamped
    }

    /// Expand the seed into its signing scalar and nonce prefix.
    pub fn to_expanded(&self) -> ExpandedSecretKey {
        ExpandedSecretKey::from(&self.seed)
    }

    /// Create an Ed25519ctx view of this key for use with the
    /// [`RandomizedSigner`] and [`RandomizedDigestSigner`] traits.
    pub fn with_context<'k, 'v>(
        &'k self,
        context: &'v [u8],
    ) -> Result<Context<'k, 'v, Self>, Error> {
        Context::new(self, context)
    }

    /// Sign a message in Ed25519ctx mode.
    ///
    /// The context string isolates signatures between protocols; it must be
    /// at most 255 bytes.
    pub fn sign_ctx_with_rng(
        &self,
        rng: &mut impl CryptoRngCore,
        context: &[u8],
        message: &[u8],
    ) -> Result<Signature, Error> {
        self.to_expanded()
            .raw_sign(rng, Some(CONTEXT_FLAG), context, message, &self.verifying_key)
    }

    /// Sign an already-hashed message in Ed25519ph mode.
    ///
    /// The caller runs SHA-512 over the message and passes the unfinalized
    /// digest here.
    pub fn sign_prehashed_with_rng<D>(
        &self,
        rng: &mut impl CryptoRngCore,
        prehashed_message: D,
        context: Option<&[u8]>,
    ) -> Result<Signature, Error>
    where
        D: Digest<OutputSize = U64>,
    {
        self.to_expanded()
            .raw_sign_prehashed(rng, prehashed_message, context, &self.verifying_key)
    }

    /// Edwards-form Diffie-Hellman with a peer's verifying key.
    ///
    /// See [`ExpandedSecretKey::derive_edwards`].
    pub fn derive_edwards(&self, their_public: &VerifyingKey) -> Result<VerifyingKey, Error> {
        self.to_expanded().derive_edwards(their_public)
    }
}

//
// `*Signer` trait impls
//

impl RandomizedSigner<Signature> for SigningKey {
    fn try_sign_with_rng(
        &self,
        rng: &mut impl CryptoRngCore,
        msg: &[u8],
    ) -> signature::Result<Signature> {
        self.to_expanded()
            .raw_sign(rng, None, &[], msg, &self.verifying_key)
            .map_err(Into::into)
    }
}

impl<D> RandomizedDigestSigner<D, Signature> for SigningKey
where
    D: Digest<OutputSize = U64>,
{
    fn try_sign_digest_with_rng(
        &self,
        rng: &mut impl CryptoRngCore,
        digest: D,
    ) -> signature::Result<Signature> {
        self.to_expanded()
            .raw_sign_prehashed(rng, digest, None, &self.verifying_key)
            .map_err(Into::into)
    }
}

impl RandomizedSigner<Signature> for Context<'_, '_, SigningKey> {
    fn try_sign_with_rng(
        &self,
        rng: &mut impl CryptoRngCore,
        msg: &[u8],
    ) -> signature::Result<Signature> {
        self.key
            .to_expanded()
            .raw_sign(
                rng,
                Some(CONTEXT_FLAG),
                self.value,
                msg,
                &self.key.verifying_key,
            )
            .map_err(Into::into)
    }
}

impl<D> RandomizedDigestSigner<D, Signature> for Context<'_, '_, SigningKey>
where
    D: Digest<OutputSize = U64>,
{
    fn try_sign_digest_with_rng(
        &self,
        rng: &mut impl CryptoRngCore,
        digest: D,
    ) -> signature::Result<Signature> {
        self.key
            .to_expanded()
            .raw_sign_prehashed(rng, digest, Some(self.value), &self.key.verifying_key)
            .map_err(Into::into)
    }
}

//
// Other trait impls
//

impl AsRef<VerifyingKey> for SigningKey {
    fn as_ref(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}

impl ConstantTimeEq for SigningKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.seed.ct_eq(&other.seed)
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("verifying_key", &self.verifying_key)
            .finish_non_exhaustive()
    }
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        self.seed.zeroize();
    }
}

/// Constant-time comparison.
impl Eq for SigningKey {}

/// Constant-time comparison.
impl PartialEq for SigningKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl From<&SecretKey> for SigningKey {
    fn from(seed: &SecretKey) -> Self {
        Self::from_bytes(seed)
    }
}

impl From<SecretKey> for SigningKey {
    fn from(seed: SecretKey) -> Self {
        Self::from_bytes(&seed)
    }
}

impl KeypairRef for SigningKey {
    type VerifyingKey = VerifyingKey;
}

impl TryFrom<&[u8]> for SigningKey {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Error> {
        SecretKey::try_from(bytes)
            .map(|seed| Self::from_bytes(&seed))
            .map_err(|_| Error::InvalidSecretKey)
    }
}

impl ZeroizeOnDrop for SigningKey {}

//
// PKCS#8 (RFC 8410)
//

#[cfg(feature = "pkcs8")]
impl TryFrom<KeypairBytes> for SigningKey {
    type Error = pkcs8::Error;

    fn try_from(pkcs8_key: KeypairBytes) -> pkcs8::Result<Self> {
        SigningKey::try_from(&pkcs8_key)
    }
}

#[cfg(feature = "pkcs8")]
impl TryFrom<&KeypairBytes> for SigningKey {
    type Error = pkcs8::Error;

    fn try_from(pkcs8_key: &KeypairBytes) -> pkcs8::Result<Self> {
        let signing_key = SigningKey::from_bytes(&pkcs8_key.secret_key);

        // An embedded public key must match the derived one.
        if let Some(public_bytes) = &pkcs8_key.public_key {
            let verifying_key =
                VerifyingKey::try_from(public_bytes).map_err(|_| pkcs8::Error::KeyMalformed)?;

            if signing_key.verifying_key() != verifying_key {
                return Err(pkcs8::Error::KeyMalformed);
            }
        }

        Ok(signing_key)
    }
}

#[cfg(feature = "pkcs8")]
impl TryFrom<pkcs8::PrivateKeyInfo<'_>> for SigningKey {
    type Error = pkcs8::Error;

    fn try_from(private_key: pkcs8::PrivateKeyInfo<'_>) -> pkcs8::Result<Self> {
        KeypairBytes::try_from(private_key)?.try_into()
    }
}

#[cfg(feature = "pkcs8")]
impl From<&SigningKey> for KeypairBytes {
    fn from(signing_key: &SigningKey) -> KeypairBytes {
        KeypairBytes {
            secret_key: signing_key.to_bytes(),
            public_key: Some(PublicKeyBytes(signing_key.verifying_key.to_bytes())),
        }
    }
}

#[cfg(all(feature = "alloc", feature = "pkcs8"))]
impl EncodePrivateKey for SigningKey {
    fn to_pkcs8_der(&self) -> pkcs8::Result<SecretDocument> {
        KeypairBytes::from(self).to_pkcs8_der()
    }
}

/// Expansion of a seed into its signing scalar and nonce-derivation prefix.
///
/// RFC 8032 § 5.1.5 splits the SHA-512 digest of the seed in half: the low
/// half is clamped into the signing scalar `a`, the high half becomes the
/// prefix from which nonces are deterministically derived. Tweaked keys
/// carry a re-derived prefix so their nonces stay unrelated to the parent
/// key's.
#[derive(Clone)]
pub struct ExpandedSecretKey {
    /// Signing scalar `a`, clamped and reduced mod the group order.
    pub scalar: Scalar,
    /// Nonce-derivation prefix.
    pub hash_prefix: [u8; 32],
}

impl From<&SecretKey> for ExpandedSecretKey {
    fn from(seed: &SecretKey) -> Self {
        let mut hash = Sha512::digest(seed);
        let mut scalar_bytes = [0u8; 32];
        scalar_bytes.copy_from_slice(&hash[..32]);
        let mut hash_prefix = [0u8; 32];
        hash_prefix.copy_from_slice(&hash[32..]);
        hash.as_mut_slice().zeroize();

        let scalar = Scalar::from_bytes_mod_order(clamp_integer(scalar_bytes));
        scalar_bytes.zeroize();

        Self {
            scalar,
            hash_prefix,
        }
    }
}

impl ExpandedSecretKey {
    /// Add a tweak to the signing scalar, mod the group order.
    ///
    /// The tweak must be a canonical scalar encoding; the zero tweak is
    /// allowed. The nonce prefix of the result is re-derived by hashing the
    /// original prefix with the tweak.
    pub fn tweak_add(&self, tweak: &[u8; 32]) -> Result<Self, Error> {
        let t = decode_tweak(tweak)?;
        let scalar = self.scalar + t;

        if scalar.ct_eq(&Scalar::ZERO).into() {
            return Err(Error::ZeroScalar);
        }

        Ok(Self {
            scalar,
            hash_prefix: self.derive_prefix(tweak),
        })
    }

    /// Multiply the signing scalar by a tweak, mod the group order.
    pub fn tweak_mul(&self, tweak: &[u8; 32]) -> Result<Self, Error> {
        let t = decode_tweak(tweak)?;
        let scalar = self.scalar * t;

        if scalar.ct_eq(&Scalar::ZERO).into() {
            return Err(Error::ZeroScalar);
        }

        Ok(Self {
            scalar,
            hash_prefix: self.derive_prefix(tweak),
        })
    }

    /// Sign a message in plain Ed25519 mode.
    pub fn sign_with_rng(&self, rng: &mut impl CryptoRngCore, message: &[u8]) -> Signature {
        let verifying_key = VerifyingKey::from(self);
        self.raw_sign(rng, None, &[], message, &verifying_key)
            .expect("plain mode carries no context")
    }

    /// Sign a message in Ed25519ctx mode.
    pub fn sign_ctx_with_rng(
        &self,
        rng: &mut impl CryptoRngCore,
        context: &[u8],
        message: &[u8],
    ) -> Result<Signature, Error> {
        let verifying_key = VerifyingKey::from(self);
        self.raw_sign(rng, Some(CONTEXT_FLAG), context, message, &verifying_key)
    }

    /// Sign an already-hashed message in Ed25519ph mode.
    pub fn sign_prehashed_with_rng<D>(
        &self,
        rng: &mut impl CryptoRngCore,
        prehashed_message: D,
        context: Option<&[u8]>,
    ) -> Result<Signature, Error>
    where
        D: Digest<OutputSize = U64>,
    {
        let verifying_key = VerifyingKey::from(self);
        self.raw_sign_prehashed(rng, prehashed_message, context, &verifying_key)
    }

    /// Edwards-form Diffie-Hellman: the shared point `a · B`.
    ///
    /// Torsion in the peer point is cleared before the secret scalar
    /// touches it. Errors if the shared point is the identity, which
    /// happens exactly when the peer point is of small order.
    pub fn derive_edwards(&self, their_public: &VerifyingKey) -> Result<VerifyingKey, Error> {
        let eighth = Scalar::from(8u8).invert();
        let point = their_public.point.mul_by_cofactor() * (eighth * self.scalar);

        if point.is_identity() {
            return Err(Error::IdentityPoint);
        }

        Ok(VerifyingKey::from_point(point))
    }

    pub(crate) fn raw_sign(
        &self,
        rng: &mut impl CryptoRngCore,
        phflag: Option<u8>,
        context: &[u8],
        message: &[u8],
        verifying_key: &VerifyingKey,
    ) -> Result<Signature, Error> {
        let r = Zeroizing::new(challenge::hash_to_scalar(
            phflag,
            context,
            &[&self.hash_prefix, message],
        )?);
        let big_r = EdwardsPoint::mul_base(&r).compress();

        let h = challenge::hash_to_scalar(
            phflag,
            context,
            &[big_r.as_bytes(), verifying_key.as_bytes(), message],
        )?;

        // Blind the signing scalar before it meets the challenge.
        let b = Zeroizing::new(loop {
            let b = Scalar::random(rng);
            if !bool::from(b.ct_eq(&Scalar::ZERO)) {
                break b;
            }
        });
        let b_inv = Zeroizing::new(b.invert());
        let s = (*r * *b + h * *b * self.scalar) * *b_inv;

        Ok(Signature::from_components(big_r.to_bytes(), s.to_bytes()))
    }

    pub(crate) fn raw_sign_prehashed<D>(
        &self,
        rng: &mut impl CryptoRngCore,
        prehashed_message: D,
        context: Option<&[u8]>,
        verifying_key: &VerifyingKey,
    ) -> Result<Signature, Error>
    where
        D: Digest<OutputSize = U64>,
    {
        let mut prehash = [0u8; 64];
        prehash.copy_from_slice(prehashed_message.finalize().as_slice());

        self.raw_sign(
            rng,
            Some(PREHASH_FLAG),
            context.unwrap_or_default(),
            &prehash,
            verifying_key,
        )
    }

    fn derive_prefix(&self, tweak: &[u8; 32]) -> [u8; 32] {
        let mut hash = Sha512::new()
            .chain_update(self.hash_prefix)
            .chain_update(tweak)
            .finalize();
        let mut prefix = [0u8; 32];
        prefix.copy_from_slice(&hash[..32]);
        hash.as_mut_slice().zeroize();
        prefix
    }
}

impl Debug for ExpandedSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpandedSecretKey").finish_non_exhaustive()
    }
}

impl Drop for ExpandedSecretKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl Zeroize for ExpandedSecretKey {
    fn zeroize(&mut self) {
        self.scalar.zeroize();
        self.hash_prefix.zeroize();
    }
}

impl ZeroizeOnDrop for ExpandedSecretKey {}

/// Decode a tweak, which must be canonical (less than the group order) but
/// may be zero.
pub(crate) fn decode_tweak(tweak: &[u8; 32]) -> Result<Scalar, Error> {
    Option::from(Scalar::from_canonical_bytes(*tweak)).ok_or(Error::InvalidScalar)
}
