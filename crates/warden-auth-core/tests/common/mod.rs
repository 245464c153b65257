//! Common test utilities for warden-auth-core integration tests

pub mod mock_provider;

use std::sync::Arc;

use chrono::DateTime;
use warden_auth_core::{AccessGate, AuthConfig, ManualClock};

#[allow(unused_imports)]
pub use mock_provider::MockIdentityProvider;

/// Key used for state tokens in tests
pub const STATE_KEY: [u8; 32] = [0x5A; 32];
/// Key used for session tokens in tests
pub const SESSION_KEY: [u8; 32] = [0xA5; 32];

/// Clock pinned to a fixed instant (2023-11-14T22:13:20Z)
pub fn fixed_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp"),
    ))
}

/// Config with fixed keys and the given allowed users
pub fn test_config(users: &[&str]) -> AuthConfig {
    AuthConfig::new(users.iter().copied())
        .with_state_key(STATE_KEY.to_vec())
        .with_session_key(SESSION_KEY.to_vec())
}

/// Gate wired to a manual clock and a mock provider
#[allow(dead_code)]
pub fn test_gate(
    users: &[&str],
) -> (AccessGate, Arc<ManualClock>, Arc<MockIdentityProvider>) {
    let clock = fixed_clock();
    let provider = Arc::new(MockIdentityProvider::new());
    let gate = AccessGate::new(&test_config(users), clock.clone(), provider.clone())
        .expect("test config is valid");
    (gate, clock, provider)
}
