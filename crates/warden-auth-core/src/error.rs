//! Auth errors

use thiserror::Error;

use crate::crypto::SignerError;

/// Why a token failed verification.
///
/// These never leave the token services as errors: `check` collapses them
/// to a plain "invalid" answer after logging. They are public so tests and
/// diagnostics can tell the failure classes apart via `verify`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Not base64url, or too short to hold a timestamp and a tag
    #[error("malformed token")]
    Malformed,

    /// Tag does not match timestamp and payload
    #[error("token tag mismatch")]
    TagMismatch,

    /// Tag matches but the token is at least as old as its TTL
    #[error("token expired")]
    Expired,

    /// Issue time lies in the future of the verifying clock
    #[error("token issued in the future")]
    FutureTimestamp,

    /// Tag matches but the payload has the wrong shape for this token class
    #[error("unexpected token payload")]
    BadPayload,
}

/// Errors surfaced by the access gate
#[derive(Error, Debug)]
pub enum AuthError {
    /// Provider callback carried a missing or invalid state token
    #[error("invalid sign-in state")]
    InvalidState,

    /// Verified identity is not on the allow-list
    #[error("user {0:?} is not authorized")]
    NotAuthorized(String),

    /// Identity provider could not turn the callback into a username
    #[error("identity exchange failed: {0}")]
    IdentityExchange(#[from] IdentityError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidState => 400,
            Self::NotAuthorized(_) => 403,
            Self::IdentityExchange(_) => 502,
            Self::Configuration(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidState => "INVALID_STATE",
            Self::NotAuthorized(_) => "NOT_AUTHORIZED",
            Self::IdentityExchange(_) => "IDENTITY_EXCHANGE_FAILED",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

impl From<SignerError> for AuthError {
    fn from(err: SignerError) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Failures reported by an identity provider
#[derive(Error, Debug)]
pub enum IdentityError {
    /// The user or the provider declined the sign-in
    #[error("sign-in denied: {0}")]
    Denied(String),

    /// The callback did not carry an authorization code
    #[error("missing authorization code")]
    MissingCode,

    /// Talking to the provider failed
    #[error("provider request failed: {0}")]
    Transport(String),

    /// The provider answered with something we cannot use
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}
