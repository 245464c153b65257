//! Keyed signing primitives for token issuance
//!
//! Every operation that touches secret key material lives here so that tag
//! comparison is kept constant-time in exactly one place.

use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Length in bytes of an HMAC-SHA256 tag
pub const TAG_LEN: usize = 32;

/// Immutable HMAC-SHA256 signer.
///
/// Cloning is cheap: the key bytes are shared behind an `Arc` and never
/// mutated after construction, so a single signer can be handed to any number
/// of concurrent verifiers.
#[derive(Clone)]
pub struct Signer {
    key_bytes: Arc<[u8]>,
}

impl Signer {
    /// Minimum allowed key length in bytes (256 bits)
    pub const MIN_KEY_LENGTH: usize = 32;

    /// Create a signer from configured key bytes.
    ///
    /// # Errors
    /// Returns error if key is too short (less than 32 bytes).
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, SignerError> {
        let key_bytes = key.as_ref();
        if key_bytes.len() < Self::MIN_KEY_LENGTH {
            return Err(SignerError::KeyTooShort {
                actual: key_bytes.len(),
                minimum: Self::MIN_KEY_LENGTH,
            });
        }
        Ok(Self {
            key_bytes: Arc::from(key_bytes),
        })
    }

    /// Create a signer with a fresh key from the OS random source.
    ///
    /// Tokens signed by a generated key stop verifying once the process exits.
    pub fn generate() -> Self {
        let mut key = [0u8; Self::MIN_KEY_LENGTH];
        OsRng.fill_bytes(&mut key);
        Self {
            key_bytes: Arc::from(&key[..]),
        }
    }

    /// Use the configured key if there is one, otherwise generate.
    pub fn from_optional(key: Option<&[u8]>) -> Result<Self, SignerError> {
        match key {
            Some(key) => Self::new(key),
            None => Ok(Self::generate()),
        }
    }

    fn create_hmac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length; the minimum is enforced in new()
        HmacSha256::new_from_slice(&self.key_bytes).expect("HMAC accepts keys of any length")
    }

    /// Sign data and return the tag
    pub fn sign(&self, data: &[u8]) -> [u8; TAG_LEN] {
        let mut mac = self.create_hmac();
        mac.update(data);
        mac.finalize().into_bytes().into()
    }

    /// Verify a tag in constant time
    pub fn verify(&self, data: &[u8], tag: &[u8]) -> bool {
        let expected = self.sign(data);
        constant_time_eq(&expected, tag)
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("key_length", &self.key_bytes.len())
            .finish_non_exhaustive()
    }
}

/// Errors that can occur when creating a signer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignerError {
    #[error("signing key too short: got {actual} bytes, need at least {minimum}")]
    KeyTooShort { actual: usize, minimum: usize },
}

/// Constant-time byte slice comparison.
///
/// Slices of different length compare unequal without inspecting contents;
/// length is not secret. Equal-length slices are compared without any
/// data-dependent branch.
#[inline]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
