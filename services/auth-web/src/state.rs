//! Application state

use std::sync::Arc;

use warden_auth_core::AccessGate;

use crate::config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Access decisions for every request
    pub gate: Arc<AccessGate>,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(gate: AccessGate, config: Config) -> Self {
        Self {
            gate: Arc::new(gate),
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}
