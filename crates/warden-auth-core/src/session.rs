//! Session tokens binding a verified username to a browser
//!
//! The payload is the username as UTF-8, prefixed with its byte length as a
//! little-endian `u32`:
//!
//! ```text
//! u32_le(len) ‖ utf8(user)
//! ```
//!
//! Decoding requires the prefix to account for every remaining byte, so an
//! empty payload (a state token) or trailing garbage never parses.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::clock::SharedClock;
use crate::crypto::Signer;
use crate::token::TokenClass;
use crate::TokenError;

/// Default session lifetime (one week)
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

const LEN_PREFIX: usize = 4;

/// A verified session. Rebuilt from the token on every request, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Username the session was issued to
    pub user: String,
}

/// Issues and checks session tokens
#[derive(Debug, Clone)]
pub struct SessionTokens {
    class: TokenClass,
}

impl SessionTokens {
    pub fn new(signer: Signer, clock: SharedClock, ttl: Duration) -> Self {
        Self {
            class: TokenClass::new(signer, clock, ttl),
        }
    }

    /// Session lifetime
    pub fn ttl(&self) -> Duration {
        self.class.ttl()
    }

    /// Issue a session token for `user`.
    ///
    /// Returns the token and its expiry so the cookie can be given the same
    /// lifetime.
    pub fn issue(&self, user: &str) -> (String, DateTime<Utc>) {
        self.class.issue(&encode_user(user))
    }

    /// Verify a session token, reporting why it failed
    pub fn verify(&self, token: &str) -> Result<Session, TokenError> {
        let verified = self.class.verify(token)?;
        let user = decode_user(verified.payload())?;
        Ok(Session { user })
    }

    /// The session carried by `token`, if it is valid and unexpired
    pub fn check(&self, token: &str) -> Option<Session> {
        match self.verify(token) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::debug!(error = %e, "Session token rejected");
                None
            }
        }
    }
}

fn encode_user(user: &str) -> Vec<u8> {
    // A name over u32::MAX bytes saturates the prefix and never decodes.
    let len = u32::try_from(user.len()).unwrap_or(u32::MAX);
    let mut buf = Vec::with_capacity(LEN_PREFIX + user.len());
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(user.as_bytes());
    buf
}

fn decode_user(payload: &[u8]) -> Result<String, TokenError> {
    if payload.len() < LEN_PREFIX {
        return Err(TokenError::BadPayload);
    }
    let (prefix, body) = payload.split_at(LEN_PREFIX);
    let mut len_bytes = [0u8; LEN_PREFIX];
    len_bytes.copy_from_slice(prefix);
    let len = u32::from_le_bytes(len_bytes) as usize;
    if len != body.len() {
        return Err(TokenError::BadPayload);
    }
    String::from_utf8(body.to_vec()).map_err(|_| TokenError::BadPayload)
}
