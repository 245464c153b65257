//! Scripted identity provider for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use warden_auth_core::{CallbackParams, IdentityError, IdentityProvider};

pub const AUTHORIZE_URL: &str = "https://idp.example/login/oauth/authorize";

/// Provider that maps authorization codes to usernames
#[derive(Default)]
pub struct MockIdentityProvider {
    codes: Mutex<HashMap<String, String>>,
    exchanges: AtomicUsize,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `code` exchange to `user`
    #[allow(dead_code)]
    pub fn grant(&self, code: &str, user: &str) {
        self.codes
            .lock()
            .expect("mock lock poisoned")
            .insert(code.to_string(), user.to_string());
    }

    /// Number of exchange calls seen
    #[allow(dead_code)]
    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    /// Pull the state token back out of a sign-in URL
    #[allow(dead_code)]
    pub fn state_from_url(url: &str) -> String {
        url.split_once("state=")
            .map(|(_, state)| state.to_string())
            .expect("sign-in URL carries a state")
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    fn sign_in_url(&self, state: &str) -> String {
        format!("{AUTHORIZE_URL}?client_id=test&state={state}")
    }

    async fn exchange(&self, params: &CallbackParams) -> Result<String, IdentityError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        let code = params.require_code()?;
        self.codes
            .lock()
            .expect("mock lock poisoned")
            .get(code)
            .cloned()
            .ok_or_else(|| IdentityError::InvalidResponse("bad_verification_code".into()))
    }
}
