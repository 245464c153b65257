//! Configuration types for the access gate

use std::time::Duration;

use crate::allow_list::AllowList;
use crate::cookie::SESSION_COOKIE;
use crate::crypto::Signer;
use crate::session::DEFAULT_SESSION_TTL;
use crate::state::DEFAULT_STATE_TTL;
use crate::AuthError;

/// Access gate configuration.
///
/// State and session tokens are signed with separate keys. Either key may be
/// left unset, in which case a random one is generated when the signers are
/// built and tokens of that class do not survive a restart.
#[derive(Clone)]
pub struct AuthConfig {
    /// Key for state tokens
    pub state_key: Option<Vec<u8>>,
    /// Key for session tokens
    pub session_key: Option<Vec<u8>>,
    /// State token lifetime
    pub state_ttl: Duration,
    /// Session token lifetime
    pub session_ttl: Duration,
    /// Usernames allowed past the gate
    pub users: Vec<String>,
    /// Name of the session cookie
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            state_key: None,
            session_key: None,
            state_ttl: DEFAULT_STATE_TTL,
            session_ttl: DEFAULT_SESSION_TTL,
            users: Vec::new(),
            cookie_name: SESSION_COOKIE.to_string(),
        }
    }
}

impl AuthConfig {
    /// Config with the given allowed users and default lifetimes
    pub fn new<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().with_users(users)
    }

    /// Set the state token key
    pub fn with_state_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.state_key = Some(key.into());
        self
    }

    /// Set the session token key
    pub fn with_session_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.session_key = Some(key.into());
        self
    }

    /// Set state token lifetime
    pub fn with_state_ttl(mut self, ttl: Duration) -> Self {
        self.state_ttl = ttl;
        self
    }

    /// Set session lifetime
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Replace the allowed users
    pub fn with_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users = users.into_iter().map(Into::into).collect();
        self
    }

    /// Set the session cookie name
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Build the state token signer
    pub fn state_signer(&self) -> Result<Signer, AuthError> {
        Ok(Signer::from_optional(self.state_key.as_deref())?)
    }

    /// Build the session token signer
    pub fn session_signer(&self) -> Result<Signer, AuthError> {
        Ok(Signer::from_optional(self.session_key.as_deref())?)
    }

    /// Build the allow-list
    pub fn allow_list(&self) -> AllowList {
        AllowList::new(self.users.iter().cloned())
    }

    /// Reject settings that would make the gate unusable
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.state_ttl.is_zero() {
            return Err(AuthError::Configuration("state TTL must be positive".into()));
        }
        if self.session_ttl.is_zero() {
            return Err(AuthError::Configuration(
                "session TTL must be positive".into(),
            ));
        }
        if self.cookie_name.is_empty() {
            return Err(AuthError::Configuration(
                "cookie name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("state_key", &self.state_key.as_ref().map(|_| "<set>"))
            .field("session_key", &self.session_key.as_ref().map(|_| "<set>"))
            .field("state_ttl", &self.state_ttl)
            .field("session_ttl", &self.session_ttl)
            .field("users", &self.users)
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}
