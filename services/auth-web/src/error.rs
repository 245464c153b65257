//! Error types for the auth web front end.
//!
//! Everything here is shown to a person in a browser, so responses are
//! short plain-text messages rather than JSON bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use warden_auth_core::AuthError;

/// Web error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Sign-in could not be completed
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Signed-in user is no longer allowed
    #[error("user {0:?} not authorized")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Auth(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Auth(AuthError::InvalidState) => {
                "Sign-in link expired or invalid, please sign in again.".to_string()
            }
            Self::Auth(AuthError::NotAuthorized(user)) => {
                format!("User {user:?} is not authorized.")
            }
            // Provider details stay in the log
            Self::Auth(AuthError::IdentityExchange(_)) => {
                "Sign-in failed, please try again.".to_string()
            }
            Self::Auth(AuthError::Configuration(_)) | Self::Internal(_) => {
                "Internal error.".to_string()
            }
            Self::Forbidden(user) => {
                format!("User {user:?} not authorized, please contact the site operator.")
            }
            Self::NotFound(message) => (*message).to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log internal errors
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (status, self.message()).into_response()
    }
}

/// Result type for web handlers
pub type ApiResult<T> = Result<T, ApiError>;
