//! Domain-separated challenge hashing.
//!
//! RFC 8032 § 5.1 derives both the nonce and the challenge scalar from a
//! SHA-512 digest. Ed25519ctx and Ed25519ph prepend the `dom2` frame: a
//! fixed prefix, a one-byte pre-hash flag, and the length-prefixed context
//! string. Plain Ed25519 has no frame at all, which is why a context cannot
//! be supplied without one of the flagged modes.

use curve25519_dalek::scalar::Scalar;
use sha2::{Digest, Sha512};

use crate::Error;

/// `dom2` prefix, RFC 8032 § 2.
const DOM2_PREFIX: &[u8; 32] = b"SigEd25519 no Ed25519 collisions";

/// Pre-hash flag for Ed25519ctx.
pub(crate) const CONTEXT_FLAG: u8 = 0;

/// Pre-hash flag for Ed25519ph.
pub(crate) const PREHASH_FLAG: u8 = 1;

/// Absorb `parts` in order and reduce the digest to a scalar mod the group
/// order, interpreting it little-endian.
///
/// `phflag` of `None` selects plain Ed25519: no `dom2` frame is emitted and
/// `context` must be empty. `Some(flag)` emits the frame with that flag
/// byte, for Ed25519ctx (`0`) or Ed25519ph (`1`).
pub(crate) fn hash_to_scalar(
    phflag: Option<u8>,
    context: &[u8],
    parts: &[&[u8]],
) -> Result<Scalar, Error> {
    // The frame carries the context length in a single byte.
    if context.len() > 255 {
        return Err(Error::ContextLength);
    }

    let mut hash = Sha512::new();

    if let Some(flag) = phflag {
        hash.update(DOM2_PREFIX);
        hash.update([flag]);
        hash.update([context.len() as u8]);
        hash.update(context);
    }

    for part in parts {
        hash.update(part);
    }

    Ok(Scalar::from_hash(hash))
}
