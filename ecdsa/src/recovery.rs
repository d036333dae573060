//! Public key recovery support.

use crate::{
    reduce_prehash, EcdsaCurve, Error, Signature, SignatureSize, SigningKey, VerifyingKey,
};
use elliptic_curve::{
    bigint::CheckedAdd,
    generic_array::ArrayLength,
    group::{Curve as _, Group},
    ops::{Invert, LinearCombination},
    point::DecompressPoint,
    sec1::{FromEncodedPoint, ModulusSize, ToEncodedPoint},
    AffinePoint, FieldBytesEncoding, FieldBytesSize, PrimeField, ProjectivePoint,
};
use signature::{digest::Digest, hazmat::PrehashVerifier, rand_core::CryptoRngCore};

/// Recovery IDs, a.k.a. "Parity bits".
///
/// Attached to a signature, the recovery ID selects which of the candidate
/// curve points computable from `r` is the true ephemeral point `R`, which
/// in turn pins down a unique public key for the signature.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct RecoveryId(u8);

impl RecoveryId {
    /// Maximum supported value (inclusive).
    pub const MAX: u8 = 3;

    /// Create a new [`RecoveryId`] from the following 1-bit arguments:
    ///
    /// - `is_y_odd`: is the affine y-coordinate of `R` odd?
    /// - `is_x_reduced`: did the affine x-coordinate of `R` overflow the
    ///   curve order when computing `r`?
    pub const fn new(is_y_odd: bool, is_x_reduced: bool) -> Self {
        Self((is_x_reduced as u8) << 1 | (is_y_odd as u8))
    }

    /// Is the affine y-coordinate of `R` odd?
    pub const fn is_y_odd(self) -> bool {
        (self.0 & 1) != 0
    }

    /// Did the affine x-coordinate of `R` overflow the curve order?
    pub const fn is_x_reduced(self) -> bool {
        (self.0 & 0b10) != 0
    }

    /// Convert a `u8` into a [`RecoveryId`], rejecting values above
    /// [`RecoveryId::MAX`].
    pub const fn from_byte(byte: u8) -> Option<Self> {
        if byte <= Self::MAX {
            Some(Self(byte))
        } else {
            None
        }
    }

    /// Convert this [`RecoveryId`] into a `u8`.
    pub const fn to_byte(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for RecoveryId {
    type Error = signature::Error;

    fn try_from(byte: u8) -> signature::Result<Self> {
        Self::from_byte(byte).ok_or_else(signature::Error::new)
    }
}

impl From<RecoveryId> for u8 {
    fn from(id: RecoveryId) -> u8 {
        id.to_byte()
    }
}

//
// Recoverable signing
//

impl<C> SigningKey<C>
where
    C: EcdsaCurve,
    SignatureSize<C>: ArrayLength<u8>,
{
    /// Sign the given message prehash, returning the signature and the
    /// [`RecoveryId`] which pins down the verifying key.
    pub fn sign_prehash_recoverable_with_rng(
        &self,
        rng: &mut impl CryptoRngCore,
        prehash: &[u8],
    ) -> Result<(Signature<C>, RecoveryId), Error> {
        self.sign_prehash_blinded(rng, prehash)
    }

    /// Hash the given message with the curve digest and sign it, returning
    /// the signature and [`RecoveryId`].
    pub fn sign_recoverable_with_rng(
        &self,
        rng: &mut impl CryptoRngCore,
        msg: &[u8],
    ) -> Result<(Signature<C>, RecoveryId), Error> {
        self.sign_prehash_recoverable_with_rng(rng, &C::Digest::digest(msg))
    }
}

//
// Recovery
//

impl<C> VerifyingKey<C>
where
    C: EcdsaCurve,
    AffinePoint<C>: DecompressPoint<C> + FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
    SignatureSize<C>: ArrayLength<u8>,
{
    /// Recover the verifying key from a message prehash, a signature over
    /// it, and the [`RecoveryId`] emitted at signing time.
    pub fn recover_from_prehash(
        prehash: &[u8],
        signature: &Signature<C>,
        recovery_id: RecoveryId,
    ) -> signature::Result<Self> {
        let (r, s) = signature.split_scalars();
        let z = reduce_prehash::<C>(prehash)?;

        let mut x_bytes = r.to_repr();

        if recovery_id.is_x_reduced() {
            // The true x-coordinate of R is r + n; only valid while the sum
            // stays below the field modulus, which decompression checks.
            match Option::<C::Uint>::from(
                C::Uint::decode_field_bytes(&x_bytes).checked_add(&C::ORDER),
            ) {
                Some(restored) => x_bytes = restored.encode_field_bytes(),
                None => return Err(signature::Error::new()),
            }
        }

        let y_is_odd = u8::from(recovery_id.is_y_odd()).into();
        let big_r = Option::<AffinePoint<C>>::from(AffinePoint::<C>::decompress(
            &x_bytes, y_is_odd,
        ))
        .ok_or_else(signature::Error::new)?;

        let r_inv = *r.invert();
        let u1 = -(r_inv * z);
        let u2 = r_inv * *s;
        let public_key = ProjectivePoint::<C>::lincomb(
            &ProjectivePoint::<C>::generator(),
            &u1,
            &ProjectivePoint::<C>::from(big_r),
            &u2,
        );

        let verifying_key = Self::from_affine(public_key.to_affine())?;

        // The key is a candidate until the signature verifies against it.
        verifying_key.verify_prehash(prehash, signature)?;

        Ok(verifying_key)
    }

    /// Recover the verifying key from an initialized message digest.
    pub fn recover_from_digest<D>(
        msg_digest: D,
        signature: &Signature<C>,
        recovery_id: RecoveryId,
    ) -> signature::Result<Self>
    where
        D: Digest,
    {
        Self::recover_from_prehash(&msg_digest.finalize(), signature, recovery_id)
    }

    /// Recover the verifying key from a message, hashing it with the curve
    /// digest.
    pub fn recover_from_msg(
        msg: &[u8],
        signature: &Signature<C>,
        recovery_id: RecoveryId,
    ) -> signature::Result<Self> {
        Self::recover_from_digest(C::Digest::new_with_prefix(msg), signature, recovery_id)
    }
}
