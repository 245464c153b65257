//! GitHub OAuth identity provider
//!
//! Sign-in sends the browser to GitHub's authorize page with our client ID
//! and a state token. The callback's code is exchanged for an access token,
//! which is then used once to look up the user's login.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use warden_auth_core::{CallbackParams, IdentityError, IdentityProvider};

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const USER_URL: &str = "https://api.github.com/user";
const USER_AGENT: &str = concat!("warden-auth-web/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
}

/// GitHub OAuth app client
#[derive(Clone)]
pub struct GitHubProvider {
    client_id: String,
    client_secret: String,
    authorize_url: Url,
    token_url: Url,
    user_url: Url,
    http_client: reqwest::Client,
}

impl GitHubProvider {
    /// Create a provider talking to github.com
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorize_url: Url::parse(AUTHORIZE_URL)?,
            token_url: Url::parse(TOKEN_URL)?,
            user_url: Url::parse(USER_URL)?,
            http_client,
        })
    }

    async fn access_token(&self, code: &str) -> Result<String, IdentityError> {
        let response: TokenResponse = self
            .http_client
            .post(self.token_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| IdentityError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;

        token_from_response(response)
    }

    async fn login(&self, access_token: &str) -> Result<String, IdentityError> {
        let user: UserResponse = self
            .http_client
            .get(self.user_url.clone())
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| IdentityError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;

        if user.login.is_empty() {
            return Err(IdentityError::InvalidResponse("empty login".into()));
        }
        Ok(user.login)
    }
}

fn token_from_response(response: TokenResponse) -> Result<String, IdentityError> {
    if let Some(error) = response.error {
        let reason = response.error_description.unwrap_or(error);
        return Err(IdentityError::Denied(reason));
    }
    response
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| IdentityError::InvalidResponse("missing access_token".into()))
}

#[async_trait]
impl IdentityProvider for GitHubProvider {
    fn sign_in_url(&self, state: &str) -> String {
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("state", state);
        url.into()
    }

    async fn exchange(&self, params: &CallbackParams) -> Result<String, IdentityError> {
        let code = params.require_code()?;
        let access_token = self.access_token(code).await?;
        self.login(&access_token).await
    }
}

impl std::fmt::Debug for GitHubProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubProvider")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}
