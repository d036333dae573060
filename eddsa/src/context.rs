use crate::Error;

/// Signing or verification context as used by Ed25519ctx and Ed25519ph.
///
/// Contexts are domain separator strings that isolate uses of the algorithm
/// between different protocols (which is very hard to reliably do otherwise)
/// and between different uses within the same protocol.
///
/// To create a context, call either of the following:
///
/// - [`SigningKey::with_context`](crate::SigningKey::with_context)
/// - [`VerifyingKey::with_context`](crate::VerifyingKey::with_context)
#[derive(Copy, Clone, Debug)]
pub struct Context<'k, 'v, K> {
    pub(crate) key: &'k K,
    pub(crate) value: &'v [u8],
}

impl<'k, 'v, K> Context<'k, 'v, K> {
    /// Maximum length of a context string.
    pub const MAX_LENGTH: usize = 255;

    pub(crate) fn new(key: &'k K, value: &'v [u8]) -> Result<Self, Error> {
        if value.len() > Self::MAX_LENGTH {
            return Err(Error::ContextLength);
        }

        Ok(Self { key, value })
    }

    /// Borrow the key.
    pub fn key(&self) -> &'k K {
        self.key
    }

    /// Borrow the context string.
    pub fn value(&self) -> &'v [u8] {
        self.value
    }
}
