//! X25519 Diffie-Hellman (RFC 7748).
//!
//! Scalars are clamped before the Montgomery ladder runs. The checked
//! [`diffie_hellman`] entry point rejects all-zero outputs, which arise
//! exactly when the peer point is of small order; the bare [`x25519`]
//! function performs no such check.

use curve25519_dalek::{montgomery::MontgomeryPoint, traits::IsIdentity};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{Error, SigningKey};

/// The X25519 basepoint, u = 9.
pub const X25519_BASEPOINT_BYTES: [u8; 32] = [
    9, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// Shared secret produced by an X25519 exchange.
///
/// Zeroed on drop. This is a bare u-coordinate; run it through a KDF
/// before using it as key material.
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    /// Serialize the shared u-coordinate.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Borrow the shared u-coordinate.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl AsRef<[u8]> for SharedSecret {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl ZeroizeOnDrop for SharedSecret {}

/// Perform an X25519 exchange, rejecting degenerate outputs.
///
/// The scalar bytes are clamped before use. Errors when the shared
/// u-coordinate is zero, which happens exactly when the peer point is of
/// small order.
pub fn diffie_hellman(
    scalar_bytes: &[u8; 32],
    their_public: &MontgomeryPoint,
) -> Result<SharedSecret, Error> {
    let shared = their_public.mul_clamped(*scalar_bytes);

    if shared.is_identity() {
        return Err(Error::SmallOrderPoint);
    }

    Ok(SharedSecret(shared.to_bytes()))
}

/// The bare X25519 function: clamp `k` and multiply the point at `u`.
///
/// No output check is performed; most callers want [`diffie_hellman`].
pub fn x25519(k: [u8; 32], u: [u8; 32]) -> [u8; 32] {
    MontgomeryPoint(u).mul_clamped(k).to_bytes()
}

impl SigningKey {
    /// Perform an X25519 exchange with the Montgomery-form scalar of this
    /// signing key.
    ///
    /// The scalar is the clamped low half of the seed's SHA-512 expansion,
    /// so the result agrees with [`ExpandedSecretKey::derive_edwards`]
    /// after converting the peer key through
    /// [`VerifyingKey::to_montgomery`].
    ///
    /// [`ExpandedSecretKey::derive_edwards`]: crate::ExpandedSecretKey::derive_edwards
    /// [`VerifyingKey::to_montgomery`]: crate::VerifyingKey::to_montgomery
    pub fn diffie_hellman(&self, their_public: &MontgomeryPoint) -> Result<SharedSecret, Error> {
        let mut scalar_bytes = self.to_scalar_bytes();
        let shared = diffie_hellman(&scalar_bytes, their_public);
        scalar_bytes.zeroize();
        shared
    }
}
