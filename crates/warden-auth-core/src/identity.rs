//! Identity provider seam
//!
//! The gate never speaks a provider protocol itself. It hands out the
//! provider's sign-in URL and later asks the provider to turn the callback
//! into a username.

use async_trait::async_trait;
use serde::Deserialize;

use crate::IdentityError;

/// Query parameters of a provider callback
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct CallbackParams {
    /// Authorization code to exchange
    pub code: Option<String>,
    /// State token echoed back by the provider
    pub state: Option<String>,
    /// Set by the provider when the user declined
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// The authorization code, or why there is none
    pub fn require_code(&self) -> Result<&str, IdentityError> {
        if let Some(error) = &self.error {
            let reason = self.error_description.as_deref().unwrap_or(error);
            return Err(IdentityError::Denied(reason.to_string()));
        }
        match self.code.as_deref() {
            Some(code) if !code.is_empty() => Ok(code),
            _ => Err(IdentityError::MissingCode),
        }
    }
}

/// Third-party sign-in
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL to send the browser to, carrying `state` for the callback to echo
    fn sign_in_url(&self, state: &str) -> String;

    /// Exchange a callback for the verified username
    async fn exchange(&self, params: &CallbackParams) -> Result<String, IdentityError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_code() {
        let params = CallbackParams {
            code: Some("abc".into()),
            ..Default::default()
        };
        assert_eq!(params.require_code().unwrap(), "abc");
    }

    #[test]
    fn test_require_code_missing_or_empty() {
        assert!(matches!(
            CallbackParams::default().require_code(),
            Err(IdentityError::MissingCode)
        ));
        let empty = CallbackParams {
            code: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(empty.require_code(), Err(IdentityError::MissingCode)));
    }

    #[test]
    fn test_provider_error_wins_over_code() {
        let params = CallbackParams {
            code: Some("abc".into()),
            error: Some("access_denied".into()),
            error_description: Some("The user has denied your application access.".into()),
            ..Default::default()
        };
        match params.require_code() {
            Err(IdentityError::Denied(reason)) => assert!(reason.contains("denied")),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
