//! Per-request access decisions
//!
//! ```text
//! Anonymous ──sign_in──▶ PendingIdentity ──callback──┬─▶ VerifiedUnauthorized (no session)
//!     ▲                                              └─▶ VerifiedAuthorized (cookie set)
//!     └──────────── sign_out / bad or expired cookie ◀──────────┘
//! ```
//!
//! The gate holds no per-user state. Everything it knows about a browser
//! comes from the session cookie, verified from scratch on each request,
//! and the allow-list is consulted every time so removing a user takes
//! effect on their next request.

use std::sync::Arc;

use crate::allow_list::AllowList;
use crate::clock::SharedClock;
use crate::config::AuthConfig;
use crate::cookie::CookieJar;
use crate::identity::{CallbackParams, IdentityProvider};
use crate::session::{Session, SessionTokens};
use crate::state::StateTokens;
use crate::AuthError;

/// Where a successful sign-in or sign-out sends the browser
pub const APP_ROOT: &str = "/";

/// What to do with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Serve the public sign-in surface
    Anonymous,
    /// Send the browser to this URL
    Redirect(String),
    /// Identity verified but not allowed
    Rejected { user: String },
    /// Serve the protected surface as `user`
    Authorized { user: String },
}

/// Decides every request from its session cookie and the allow-list
#[derive(Clone)]
pub struct AccessGate {
    states: StateTokens,
    sessions: SessionTokens,
    allow_list: Arc<AllowList>,
    provider: Arc<dyn IdentityProvider>,
    cookie_name: String,
}

impl AccessGate {
    /// Build a gate from configuration
    ///
    /// # Errors
    /// [`AuthError::Configuration`] for a short key, a zero TTL or an empty
    /// cookie name.
    pub fn new(
        config: &AuthConfig,
        clock: SharedClock,
        provider: Arc<dyn IdentityProvider>,
    ) -> Result<Self, AuthError> {
        config.validate()?;
        let states = StateTokens::new(config.state_signer()?, Arc::clone(&clock), config.state_ttl);
        let sessions = SessionTokens::new(config.session_signer()?, clock, config.session_ttl);
        Ok(Self::from_parts(
            states,
            sessions,
            config.allow_list(),
            provider,
            config.cookie_name.clone(),
        ))
    }

    /// Assemble a gate from already-built services
    pub fn from_parts(
        states: StateTokens,
        sessions: SessionTokens,
        allow_list: AllowList,
        provider: Arc<dyn IdentityProvider>,
        cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            states,
            sessions,
            allow_list: Arc::new(allow_list),
            provider,
            cookie_name: cookie_name.into(),
        }
    }

    /// Same keys and lifetimes, different allowed users
    pub fn with_allow_list(&self, allow_list: AllowList) -> Self {
        Self {
            allow_list: Arc::new(allow_list),
            ..self.clone()
        }
    }

    pub fn states(&self) -> &StateTokens {
        &self.states
    }

    pub fn sessions(&self) -> &SessionTokens {
        &self.sessions
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Start sign-in: redirect to the provider with a fresh state token.
    /// No cookie is written.
    pub fn sign_in(&self) -> GateDecision {
        GateDecision::Redirect(self.provider.sign_in_url(&self.states.issue()))
    }

    /// Finish sign-in from the provider callback.
    ///
    /// On success the session cookie is written and the browser is sent to
    /// [`APP_ROOT`]. On any error the jar is left untouched.
    ///
    /// # Errors
    /// - [`AuthError::InvalidState`] if the echoed state does not verify
    /// - [`AuthError::IdentityExchange`] if the provider cannot name the user
    /// - [`AuthError::NotAuthorized`] if the user is not on the allow-list
    pub async fn callback<J: CookieJar>(
        &self,
        params: &CallbackParams,
        jar: &mut J,
    ) -> Result<GateDecision, AuthError> {
        let state = params.state.as_deref().unwrap_or_default();
        if !self.states.check(state) {
            tracing::warn!("Sign-in callback with invalid state");
            return Err(AuthError::InvalidState);
        }

        let user = self.provider.exchange(params).await.map_err(|e| {
            tracing::warn!(error = %e, "Identity exchange failed");
            AuthError::IdentityExchange(e)
        })?;

        if !self.allow_list.contains(&user) {
            tracing::warn!(user = %user, "Unauthorized user tried to sign in");
            return Err(AuthError::NotAuthorized(user));
        }

        tracing::info!(user = %user, "User signed in");
        let (token, expires_at) = self.sessions.issue(&user);
        jar.write(&self.cookie_name, &token, expires_at);
        Ok(GateDecision::Redirect(APP_ROOT.to_string()))
    }

    /// Sign out, whatever state the browser was in
    pub fn sign_out<J: CookieJar>(&self, jar: &mut J) -> GateDecision {
        if let Some(session) = self.current_session(jar) {
            tracing::info!(user = %session.user, "User signed out");
        }
        jar.clear(&self.cookie_name);
        GateDecision::Redirect(APP_ROOT.to_string())
    }

    /// Decide a protected request
    pub fn authorize<J: CookieJar>(&self, jar: &mut J) -> GateDecision {
        let Some(session) = self.current_session(jar) else {
            jar.clear(&self.cookie_name);
            return GateDecision::Anonymous;
        };

        if !self.allow_list.contains(&session.user) {
            tracing::warn!(user = %session.user, "Session for user no longer allowed");
            jar.clear(&self.cookie_name);
            return GateDecision::Rejected { user: session.user };
        }

        GateDecision::Authorized { user: session.user }
    }

    fn current_session<J: CookieJar>(&self, jar: &J) -> Option<Session> {
        let token = jar.read(&self.cookie_name)?;
        self.sessions.check(&token)
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("allowed_users", &self.allow_list.len())
            .field("cookie_name", &self.cookie_name)
            .finish_non_exhaustive()
    }
}
