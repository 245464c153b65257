//! Issue and verify pipeline shared by every token class
//!
//! A [`TokenClass`] pairs a [`Signer`] with a clock and a TTL. The state and
//! session services each own one and add their own payload shape on top.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::clock::{unix_nanos, SharedClock};
use crate::codec::{decode_token, encode_token, signed_bytes};
use crate::crypto::Signer;
use crate::TokenError;

/// A token whose tag and age have both been checked.
///
/// Only [`TokenClass::verify`] constructs this, so holding one means the
/// payload came from this process's key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    issued_at: DateTime<Utc>,
    payload: Vec<u8>,
}

impl VerifiedToken {
    /// When the token was issued
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// The verified payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Take ownership of the payload
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

/// Signer, clock and TTL for one kind of token
#[derive(Clone)]
pub struct TokenClass {
    signer: Signer,
    clock: SharedClock,
    ttl: Duration,
}

impl TokenClass {
    pub fn new(signer: Signer, clock: SharedClock, ttl: Duration) -> Self {
        Self { signer, clock, ttl }
    }

    /// Maximum accepted age
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign `payload` at the current instant.
    ///
    /// Returns the opaque token and the instant it stops verifying.
    pub fn issue(&self, payload: &[u8]) -> (String, DateTime<Utc>) {
        let now = self.clock.now();
        let issued_at_nanos = unix_nanos(now);
        let tag = self.signer.sign(&signed_bytes(issued_at_nanos, payload));
        let token = encode_token(issued_at_nanos, payload, &tag);
        let expires_at = chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        (token, expires_at)
    }

    /// Decode, check the tag, then check the age.
    ///
    /// The tag is checked before the timestamp is looked at so nothing
    /// about an unverified token influences the result beyond "invalid".
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        let raw = decode_token(token)?;
        if !self.signer.verify(&raw.signed_bytes(), &raw.tag) {
            return Err(TokenError::TagMismatch);
        }
        if raw.issued_at_nanos < 0 {
            return Err(TokenError::Malformed);
        }

        let now = unix_nanos(self.clock.now());
        let elapsed = i128::from(now) - i128::from(raw.issued_at_nanos);
        if elapsed < 0 {
            return Err(TokenError::FutureTimestamp);
        }
        // `elapsed` is non-negative here
        if elapsed.unsigned_abs() >= self.ttl.as_nanos() {
            return Err(TokenError::Expired);
        }

        Ok(VerifiedToken {
            issued_at: DateTime::from_timestamp_nanos(raw.issued_at_nanos),
            payload: raw.payload,
        })
    }
}

impl std::fmt::Debug for TokenClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenClass")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
