//! Token wire format
//!
//! ```text
//! base64url( i64_le(issued_at_nanos) ‖ payload ‖ tag )
//! ```
//!
//! Tokens are issued in padded base64url. Decoding also accepts the
//! unpadded form, since padding is often stripped in transit.
//!
//! The codec only frames bytes. It never checks the tag; callers verify
//! [`RawToken::signed_bytes`] against [`RawToken::tag`] before trusting
//! anything decoded here.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use crate::crypto::TAG_LEN;
use crate::TokenError;

/// Length of the little-endian nanosecond timestamp prefix
pub const TIMESTAMP_LEN: usize = 8;

/// Shortest possible decoded token (empty payload)
pub const MIN_TOKEN_LEN: usize = TIMESTAMP_LEN + TAG_LEN;

const TOKEN_DECODER: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A decoded but unverified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    /// Claimed issue time, nanoseconds since the Unix epoch
    pub issued_at_nanos: i64,
    /// Class-specific payload
    pub payload: Vec<u8>,
    /// Claimed tag over `signed_bytes()`
    pub tag: [u8; TAG_LEN],
}

impl RawToken {
    /// The exact bytes the tag must cover
    pub fn signed_bytes(&self) -> Vec<u8> {
        signed_bytes(self.issued_at_nanos, &self.payload)
    }
}

/// Concatenate timestamp and payload as they are signed
pub fn signed_bytes(issued_at_nanos: i64, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(TIMESTAMP_LEN + payload.len() + TAG_LEN);
    buf.extend_from_slice(&issued_at_nanos.to_le_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Frame timestamp, payload and tag into the opaque string form
pub fn encode_token(issued_at_nanos: i64, payload: &[u8], tag: &[u8; TAG_LEN]) -> String {
    let mut buf = signed_bytes(issued_at_nanos, payload);
    buf.extend_from_slice(tag);
    URL_SAFE.encode(buf)
}

/// Split an opaque string back into its parts
///
/// # Errors
/// [`TokenError::Malformed`] if the input is not base64url (padded or not)
/// or is shorter than a timestamp plus a tag.
pub fn decode_token(token: &str) -> Result<RawToken, TokenError> {
    let bytes = TOKEN_DECODER
        .decode(token)
        .map_err(|_| TokenError::Malformed)?;
    if bytes.len() < MIN_TOKEN_LEN {
        return Err(TokenError::Malformed);
    }

    let (ts, rest) = bytes.split_at(TIMESTAMP_LEN);
    let (payload, tag) = rest.split_at(rest.len() - TAG_LEN);

    let mut ts_bytes = [0u8; TIMESTAMP_LEN];
    ts_bytes.copy_from_slice(ts);
    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(tag);

    Ok(RawToken {
        issued_at_nanos: i64::from_le_bytes(ts_bytes),
        payload: payload.to_vec(),
        tag: tag_bytes,
    })
}
