#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(
    clippy::mod_module_files,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]

//! ## Usage
//!
//! Signing is explicitly randomized: every signing operation takes a
//! cryptographically secure RNG which drives scalar blinding (the nonce
//! itself is derived deterministically per RFC 6979, so signatures are
//! reproducible regardless of the RNG).
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use ecsig_ecdsa::{
//!     secp256k1::{Signature, SigningKey, VerifyingKey},
//!     signature::{hazmat::{PrehashVerifier, RandomizedPrehashSigner}},
//! };
//! use rand_core::OsRng;
//! use sha2::{Digest, Sha256};
//!
//! let signing_key = SigningKey::random(&mut OsRng);
//! let prehash = Sha256::digest(b"example message");
//! let signature: Signature = signing_key.sign_prehash_with_rng(&mut OsRng, &prehash)?;
//!
//! let verifying_key = VerifyingKey::from(&signing_key);
//! verifying_key.verify_prehash(&prehash, &signature)?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "der")]
pub mod der;
#[cfg(feature = "ecdh")]
pub mod ecdh;
#[cfg(feature = "p256")]
pub mod nistp256;
#[cfg(feature = "k256")]
pub mod secp256k1;

mod recovery;
mod signing;
mod verifying;

pub use crate::{recovery::RecoveryId, signing::SigningKey, verifying::VerifyingKey};
pub use elliptic_curve::{self, FieldBytes, NonZeroScalar, PublicKey, SecretKey};
pub use signature;

#[cfg(feature = "pkcs8")]
pub use elliptic_curve::pkcs8;

use core::{fmt, ops::Add};
use elliptic_curve::{
    generic_array::{sequence::Concat, typenum::Unsigned, ArrayLength, GenericArray},
    ops::Reduce,
    scalar::IsHigh,
    Curve, CurveArithmetic, FieldBytesEncoding, FieldBytesSize, PrimeCurve, Scalar,
    ScalarPrimitive,
};
use signature::digest::{core_api::BlockSizeUser, Digest, FixedOutputReset};

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// Shortest accepted message digest: 160 bits.
///
/// Anything shorter is not the output of a cryptographic hash function and is
/// rejected outright rather than zero-extended.
pub const MIN_PREHASH_SIZE: usize = 20;

/// Longest accepted message digest: 1024 bits.
pub const MAX_PREHASH_SIZE: usize = 128;

/// Curve usable with this ECDSA engine.
///
/// Binds a short-Weierstrass prime-order curve to the digest used for
/// RFC 6979 nonce generation and by the message-signing trait impls.
pub trait EcdsaCurve: PrimeCurve + CurveArithmetic {
    /// Digest used to derive nonces and to hash messages.
    type Digest: BlockSizeUser + Digest + FixedOutputReset;
}

/// Errors raised when keys, scalars, or messages fail validation.
///
/// Verification-style operations never surface these: anything that runs on
/// untrusted input reports the opaque [`signature::Error`] instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Secret key is zero, not canonical, or the wrong length.
    InvalidSecretKey,

    /// Scalar (e.g. a tweak) exceeds the curve order or has the wrong length.
    InvalidScalar,

    /// Public key failed to decode or validate.
    InvalidPublicKey,

    /// Operation produced the point at infinity.
    IdentityPoint,

    /// Operation produced the zero scalar.
    ZeroScalar,

    /// Message digest length is outside `[MIN_PREHASH_SIZE, MAX_PREHASH_SIZE]`.
    MessageSize,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::InvalidSecretKey => "invalid secret key",
            Error::InvalidScalar => "scalar out of range for the curve order",
            Error::InvalidPublicKey => "invalid public key",
            Error::IdentityPoint => "operation produced the point at infinity",
            Error::ZeroScalar => "operation produced the zero scalar",
            Error::MessageSize => "unsupported message digest length",
        })
    }
}

impl From<Error> for signature::Error {
    fn from(_: Error) -> signature::Error {
        signature::Error::new()
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Size of a fixed-width signature for the given curve: twice the field size.
pub type SignatureSize<C> = <FieldBytesSize<C> as Add>::Output;

/// Fixed-width signature serialized as bytes.
pub type SignatureBytes<C> = GenericArray<u8, SignatureSize<C>>;

/// ECDSA signature in fixed-width `r ‖ s` form.
///
/// Low-S normalized on creation by the signer; [`Signature::from_bytes`]
/// accepts the high-S form as well, so that externally produced signatures
/// still verify. Use [`Signature::is_low_s`] to test for the canonical form.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Signature<C: PrimeCurve> {
    r: ScalarPrimitive<C>,
    s: ScalarPrimitive<C>,
}

impl<C> Signature<C>
where
    C: PrimeCurve,
    SignatureSize<C>: ArrayLength<u8>,
{
    /// Parse a signature from fixed-width bytes.
    ///
    /// Both scalars must be canonical (less than the curve order) and
    /// nonzero.
    pub fn from_bytes(bytes: &SignatureBytes<C>) -> signature::Result<Self> {
        let (r_bytes, s_bytes) = bytes.split_at(C::FieldBytesSize::USIZE);
        let r = ScalarPrimitive::from_slice(r_bytes).map_err(|_| signature::Error::new())?;
        let s = ScalarPrimitive::from_slice(s_bytes).map_err(|_| signature::Error::new())?;

        if r.is_zero().into() || s.is_zero().into() {
            return Err(signature::Error::new());
        }

        Ok(Self { r, s })
    }

    /// Parse a signature from a byte slice.
    pub fn from_slice(bytes: &[u8]) -> signature::Result<Self> {
        if bytes.len() != SignatureSize::<C>::USIZE {
            return Err(signature::Error::new());
        }

        Self::from_bytes(SignatureBytes::<C>::from_slice(bytes))
    }

    /// Create a signature from the serialized `r` and `s` components.
    pub fn from_scalars(
        r: impl Into<FieldBytes<C>>,
        s: impl Into<FieldBytes<C>>,
    ) -> signature::Result<Self> {
        Self::from_bytes(&r.into().concat(s.into()))
    }

    /// Serialize this signature as fixed-width bytes.
    pub fn to_bytes(&self) -> SignatureBytes<C> {
        self.r_bytes().concat(self.s_bytes())
    }

    /// Bytes for the `r` component.
    pub fn r_bytes(&self) -> FieldBytes<C> {
        self.r.to_bytes()
    }

    /// Bytes for the `s` component.
    pub fn s_bytes(&self) -> FieldBytes<C> {
        self.s.to_bytes()
    }

    /// Convert this signature into a byte vector.
    #[cfg(feature = "alloc")]
    pub fn to_vec(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }
}

impl<C> Signature<C>
where
    C: PrimeCurve + CurveArithmetic,
    SignatureSize<C>: ArrayLength<u8>,
{
    /// Get the `r` component of this signature.
    pub fn r(&self) -> NonZeroScalar<C> {
        NonZeroScalar::new(self.r.into()).expect("r is nonzero by construction")
    }

    /// Get the `s` component of this signature.
    pub fn s(&self) -> NonZeroScalar<C> {
        NonZeroScalar::new(self.s.into()).expect("s is nonzero by construction")
    }

    /// Split the signature into its `r` and `s` scalars.
    pub fn split_scalars(&self) -> (NonZeroScalar<C>, NonZeroScalar<C>) {
        (self.r(), self.s())
    }

    /// Is the `s` component in the low half of the scalar range?
    ///
    /// Signers produced by this crate always emit low-S signatures; this
    /// predicate checks foreign signatures against the same malleability
    /// convention.
    pub fn is_low_s(&self) -> bool {
        !bool::from(self.s().is_high())
    }

    /// Return the low-S normalized counterpart of this signature, or `None`
    /// if it is already normalized.
    pub fn normalize_s(&self) -> Option<Self> {
        let s = self.s();

        if s.is_high().into() {
            let mut result = *self;
            result.s = (-*s).into();
            Some(result)
        } else {
            None
        }
    }
}

impl<C> fmt::Debug for Signature<C>
where
    C: PrimeCurve,
    SignatureSize<C>: ArrayLength<u8>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ecsig_ecdsa::Signature<{:?}>(", C::default())?;

        for byte in self.to_bytes() {
            write!(f, "{:02X}", byte)?;
        }

        write!(f, ")")
    }
}

impl<C> From<Signature<C>> for SignatureBytes<C>
where
    C: PrimeCurve,
    SignatureSize<C>: ArrayLength<u8>,
{
    fn from(signature: Signature<C>) -> SignatureBytes<C> {
        signature.to_bytes()
    }
}

impl<C> From<&Signature<C>> for SignatureBytes<C>
where
    C: PrimeCurve,
    SignatureSize<C>: ArrayLength<u8>,
{
    fn from(signature: &Signature<C>) -> SignatureBytes<C> {
        signature.to_bytes()
    }
}

impl<C> signature::SignatureEncoding for Signature<C>
where
    C: PrimeCurve,
    SignatureSize<C>: ArrayLength<u8>,
{
    type Repr = SignatureBytes<C>;
}

impl<C> TryFrom<SignatureBytes<C>> for Signature<C>
where
    C: PrimeCurve,
    SignatureSize<C>: ArrayLength<u8>,
{
    type Error = signature::Error;

    fn try_from(bytes: SignatureBytes<C>) -> signature::Result<Self> {
        Self::from_bytes(&bytes)
    }
}

impl<C> TryFrom<&[u8]> for Signature<C>
where
    C: PrimeCurve,
    SignatureSize<C>: ArrayLength<u8>,
{
    type Error = signature::Error;

    fn try_from(bytes: &[u8]) -> signature::Result<Self> {
        Self::from_slice(bytes)
    }
}

/// Convert a message digest to field bytes, RFC 6979 style: take the leftmost
/// `bits(n)` bits of the digest, zero-extending on the left when the digest is
/// shorter than the field.
pub(crate) fn prehash_to_field_bytes<C>(prehash: &[u8]) -> Result<FieldBytes<C>, Error>
where
    C: EcdsaCurve,
{
    if !(MIN_PREHASH_SIZE..=MAX_PREHASH_SIZE).contains(&prehash.len()) {
        return Err(Error::MessageSize);
    }

    let size = C::FieldBytesSize::USIZE;
    let mut field_bytes = FieldBytes::<C>::default();

    if prehash.len() < size {
        field_bytes[size - prehash.len()..].copy_from_slice(prehash);
        return Ok(field_bytes);
    }

    field_bytes.copy_from_slice(&prehash[..size]);
    truncate_high_bits::<C>(&mut field_bytes);

    Ok(field_bytes)
}

/// Keep the leftmost `bits(n)` bits of a full-width big endian value.
///
/// For curves whose order is not byte-aligned, this shifts the excess low
/// bits out so the result occupies the same bit width as the order. No-op
/// for byte-aligned orders.
pub(crate) fn truncate_high_bits<C>(field_bytes: &mut FieldBytes<C>)
where
    C: Curve,
{
    let excess = C::FieldBytesSize::USIZE * 8 - order_bit_length::<C>();

    if excess > 0 {
        let mut carry = 0;

        for byte in field_bytes.iter_mut() {
            let next = *byte << (8 - excess);
            *byte = (*byte >> excess) | carry;
            carry = next;
        }
    }
}

/// Truncate-then-reduce a message digest into a scalar.
pub(crate) fn reduce_prehash<C>(prehash: &[u8]) -> Result<Scalar<C>, Error>
where
    C: EcdsaCurve,
{
    let field_bytes = prehash_to_field_bytes::<C>(prehash)?;
    Ok(<Scalar<C> as Reduce<C::Uint>>::reduce_bytes(&field_bytes))
}

/// Decode a tweak, which must be canonical (less than the curve order) but
/// may be zero.
pub(crate) fn decode_tweak<C>(tweak: &FieldBytes<C>) -> Result<Scalar<C>, Error>
where
    C: EcdsaCurve,
{
    Option::<ScalarPrimitive<C>>::from(ScalarPrimitive::from_bytes(tweak))
        .map(Scalar::<C>::from)
        .ok_or(Error::InvalidScalar)
}

fn order_bit_length<C: Curve>() -> usize {
    let order = FieldBytesEncoding::<C>::encode_field_bytes(&C::ORDER);
    let mut bits = order.len() * 8;

    for &byte in order.iter() {
        if byte == 0 {
            bits -= 8;
        } else {
            bits -= byte.leading_zeros() as usize;
            break;
        }
    }

    bits
}
