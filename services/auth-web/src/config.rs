//! Configuration for the auth web front end.

use std::path::PathBuf;
use std::time::Duration;

use warden_auth_core::{AuthConfig, Signer};

/// Auth web configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// GitHub OAuth app client ID
    pub github_client_id: String,

    /// GitHub OAuth app client secret
    pub github_client_secret: String,

    /// Auth core configuration
    pub auth: AuthConfig,

    /// Directory holding the site's static files
    pub site_dir: PathBuf,

    /// Global the `/data/` scripts assign to
    pub data_var: String,

    /// Whether cookies are marked `Secure`
    pub cookie_secure: bool,

    /// Per-request timeout, also bounds calls to GitHub
    pub request_timeout: Duration,

    /// Whether to record metrics and serve `/metrics`
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &'static str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // Server
        let http_port = var("HTTP_PORT", "8080")
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        // GitHub OAuth app
        let github_client_id =
            lookup("GITHUB_CLIENT_ID").ok_or(ConfigError::Missing("GITHUB_CLIENT_ID"))?;
        let github_client_secret =
            lookup("GITHUB_CLIENT_SECRET").ok_or(ConfigError::Missing("GITHUB_CLIENT_SECRET"))?;

        // Allowed users
        let users: Vec<String> = lookup("ALLOWED_USERS")
            .ok_or(ConfigError::Missing("ALLOWED_USERS"))?
            .split(',')
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(String::from)
            .collect();
        if users.is_empty() {
            return Err(ConfigError::Invalid("ALLOWED_USERS must name at least one user"));
        }

        // Signing keys (optional, minimum 32 bytes)
        let state_key = optional_key(&lookup, "STATE_KEY")?;
        let session_key = optional_key(&lookup, "SESSION_KEY")?;

        // Token lifetimes
        let state_ttl_secs: u64 = var("STATE_TTL_SECS", "180")
            .parse()
            .map_err(|_| ConfigError::Invalid("STATE_TTL_SECS"))?;
        let session_ttl_secs = var("SESSION_TTL_HOURS", "168")
            .parse::<u64>()
            .ok()
            .and_then(|hours| hours.checked_mul(3600))
            .ok_or(ConfigError::Invalid("SESSION_TTL_HOURS"))?;

        let site_dir = PathBuf::from(var("SITE_DIR", "_"));
        let data_var = var("SITE_DATA_VAR", DEFAULT_DATA_VAR);
        if !is_js_identifier(&data_var) {
            return Err(ConfigError::Invalid("SITE_DATA_VAR"));
        }

        let cookie_secure = var("COOKIE_SECURE", "true")
            .parse()
            .map_err(|_| ConfigError::Invalid("COOKIE_SECURE"))?;

        // Request timeout (default 30 seconds)
        let request_timeout_secs: u64 = var("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;

        // Metrics
        let metrics_enabled = var("METRICS_ENABLED", "true").parse().unwrap_or(true);

        let mut auth = AuthConfig::new(users)
            .with_state_ttl(Duration::from_secs(state_ttl_secs))
            .with_session_ttl(Duration::from_secs(session_ttl_secs));
        if let Some(key) = state_key {
            auth = auth.with_state_key(key);
        }
        if let Some(key) = session_key {
            auth = auth.with_session_key(key);
        }
        auth.validate()
            .map_err(|e| ConfigError::AuthConfig(e.to_string()))?;

        Ok(Self {
            http_port,
            github_client_id,
            github_client_secret,
            auth,
            site_dir,
            data_var,
            cookie_secure,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
        })
    }
}

/// Default global for `/data/` scripts
pub const DEFAULT_DATA_VAR: &str = "siteData";

fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn optional_key(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<Vec<u8>>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(key) if key.len() < Signer::MIN_KEY_LENGTH => Err(ConfigError::Invalid(name)),
        Some(key) => Ok(Some(key.into_bytes())),
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Auth config error: {0}")]
    AuthConfig(String),
}
