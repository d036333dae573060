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
//! itself is derived deterministically per RFC 8032, so signatures are
//! reproducible regardless of the RNG).
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use ecsig_eddsa::{
//!     signature::{RandomizedSigner, Verifier},
//!     Signature, SigningKey,
//! };
//! use rand_core::OsRng;
//!
//! let signing_key = SigningKey::generate(&mut OsRng);
//! let message = b"example message";
//! let signature: Signature = signing_key.try_sign_with_rng(&mut OsRng, message)?;
//!
//! let verifying_key = signing_key.verifying_key();
//! verifying_key.verify(message, &signature)?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod x25519;

mod challenge;
mod context;
mod signing;
mod verifying;

pub use crate::{
    context::Context,
    signing::{ExpandedSecretKey, SigningKey},
    verifying::VerifyingKey,
};
pub use curve25519_dalek::{self, montgomery::MontgomeryPoint, scalar::Scalar};
pub use ed25519::{self, Signature, SignatureBytes};
pub use signature;

#[cfg(feature = "pkcs8")]
pub use ed25519::pkcs8;

use core::fmt;

/// Length of an Ed25519 secret key seed in bytes.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Length of an Ed25519 public key in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Length of an Ed25519 signature in bytes.
pub const SIGNATURE_LENGTH: usize = Signature::BYTE_SIZE;

/// Ed25519 secret key seed: 32 uniformly random bytes.
///
/// The signing scalar and nonce prefix are both derived from the seed by
/// hashing; see [`ExpandedSecretKey`].
pub type SecretKey = [u8; SECRET_KEY_LENGTH];

/// Errors raised when keys, scalars, or contexts fail validation.
///
/// Verification-style operations never surface these: anything that runs on
/// untrusted input reports the opaque [`signature::Error`] instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Secret key seed has the wrong length.
    InvalidSecretKey,

    /// Scalar (e.g. a tweak) is not a canonical encoding of an integer below
    /// the group order.
    InvalidScalar,

    /// Public key bytes failed to decode to a curve point.
    InvalidPublicKey,

    /// Operation produced the identity point.
    IdentityPoint,

    /// Operation produced the zero scalar.
    ZeroScalar,

    /// Context string is longer than 255 bytes.
    ContextLength,

    /// Key exchange peer point is of small order.
    SmallOrderPoint,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::InvalidSecretKey => "invalid secret key seed",
            Error::InvalidScalar => "scalar is not canonical for the group order",
            Error::InvalidPublicKey => "invalid public key",
            Error::IdentityPoint => "operation produced the identity point",
            Error::ZeroScalar => "operation produced the zero scalar",
            Error::ContextLength => "context string is longer than 255 bytes",
            Error::SmallOrderPoint => "peer point is of small order",
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
