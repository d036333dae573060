//! NIST P-256 curve support.
//!
//! Binds the [`p256`] arithmetic backend to the signing, verification, and
//! recovery machinery, with SHA-256 as the curve digest.

pub use p256::NistP256;

use crate::EcdsaCurve;
use sha2::Sha256;

impl EcdsaCurve for NistP256 {
    type Digest = Sha256;
}

/// ECDSA/P-256 signature (fixed-width).
pub type Signature = crate::Signature<NistP256>;

/// ECDSA/P-256 signature (ASN.1 DER).
#[cfg(feature = "der")]
pub type DerSignature = crate::der::Signature<NistP256>;

/// ECDSA/P-256 signing key.
pub type SigningKey = crate::SigningKey<NistP256>;

/// ECDSA/P-256 verifying key.
pub type VerifyingKey = crate::VerifyingKey<NistP256>;
