//! Elliptic Curve Diffie-Hellman support.
//!
//! Key exchange runs between a [`SigningKey`] and a peer's [`VerifyingKey`],
//! or through [`EphemeralSecret`] for one-shot exchanges. Because both sides
//! hold validated, non-identity keys and scalars are nonzero by type, the
//! shared point can never be the identity and the exchange is total.

pub use elliptic_curve::ecdh::{diffie_hellman, EphemeralSecret, SharedSecret};

use crate::{EcdsaCurve, SigningKey, VerifyingKey};

impl<C> SigningKey<C>
where
    C: EcdsaCurve,
{
    /// Compute the Diffie-Hellman shared secret between this key and a
    /// peer's public key.
    ///
    /// The result wraps the raw x-coordinate of the shared point; run it
    /// through a KDF before using it as symmetric key material.
    pub fn diffie_hellman(&self, public_key: &VerifyingKey<C>) -> SharedSecret<C> {
        diffie_hellman(self.as_nonzero_scalar(), public_key.as_affine())
    }
}
