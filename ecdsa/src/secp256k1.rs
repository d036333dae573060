//! secp256k1 curve support.
//!
//! Binds the [`k256`] arithmetic backend to the signing, verification, and
//! recovery machinery, with SHA-256 as the curve digest.

pub use k256::Secp256k1;

use crate::EcdsaCurve;
use sha2::Sha256;

impl EcdsaCurve for Secp256k1 {
    type Digest = Sha256;
}

/// ECDSA/secp256k1 signature (fixed-width).
pub type Signature = crate::Signature<Secp256k1>;

/// ECDSA/secp256k1 signature (ASN.1 DER).
#[cfg(feature = "der")]
pub type DerSignature = crate::der::Signature<Secp256k1>;

/// ECDSA/secp256k1 signing key.
pub type SigningKey = crate::SigningKey<Secp256k1>;

/// ECDSA/secp256k1 verifying key.
pub type VerifyingKey = crate::VerifyingKey<Secp256k1>;
