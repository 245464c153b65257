//! Anti-forgery state tokens for the sign-in redirect
//!
//! A state token carries nothing but its issue time. Nothing is recorded
//! when one is issued, so a token can be presented any number of times
//! until it expires; it binds the callback to a redirect this process
//! produced, it is not a single-use nonce.

use std::time::Duration;

use crate::clock::SharedClock;
use crate::crypto::Signer;
use crate::token::TokenClass;
use crate::TokenError;

/// Default lifetime of a state token
pub const DEFAULT_STATE_TTL: Duration = Duration::from_secs(3 * 60);

/// Issues and checks state tokens
#[derive(Debug, Clone)]
pub struct StateTokens {
    class: TokenClass,
}

impl StateTokens {
    pub fn new(signer: Signer, clock: SharedClock, ttl: Duration) -> Self {
        Self {
            class: TokenClass::new(signer, clock, ttl),
        }
    }

    /// State token lifetime
    pub fn ttl(&self) -> Duration {
        self.class.ttl()
    }

    /// Issue a fresh state token
    pub fn issue(&self) -> String {
        self.class.issue(&[]).0
    }

    /// Verify a state token, reporting why it failed
    pub fn verify(&self, token: &str) -> Result<(), TokenError> {
        let verified = self.class.verify(token)?;
        if !verified.payload().is_empty() {
            return Err(TokenError::BadPayload);
        }
        Ok(())
    }

    /// Whether `token` is a valid, unexpired state token
    pub fn check(&self, token: &str) -> bool {
        match self.verify(token) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "State token rejected");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Arc;

    fn states() -> (StateTokens, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let signer = Signer::new([5u8; 32]).unwrap();
        (StateTokens::new(signer, clock.clone(), DEFAULT_STATE_TTL), clock)
    }

    #[test]
    fn test_fresh_state_checks() {
        let (states, _) = states();
        let token = states.issue();
        assert!(states.check(&token));
    }

    #[test]
    fn test_state_can_be_presented_repeatedly_within_ttl() {
        let (states, clock) = states();
        let token = states.issue();
        assert!(states.check(&token));
        clock.advance(Duration::from_secs(60));
        assert!(states.check(&token));
        assert!(states.check(&token));
    }

    #[test]
    fn test_state_expires_after_three_minutes() {
        let (states, clock) = states();
        let token = states.issue();
        clock.advance(DEFAULT_STATE_TTL - Duration::from_millis(1));
        assert!(states.check(&token));
        clock.advance(Duration::from_millis(2));
        assert!(!states.check(&token));
        assert_eq!(states.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_state_from_future_rejected() {
        let (states, clock) = states();
        let token = states.issue();
        clock.rewind(Duration::from_secs(1));
        assert_eq!(states.verify(&token), Err(TokenError::FutureTimestamp));
    }

    #[test]
    fn test_malformed_state_is_false() {
        let (states, _) = states();
        assert!(!states.check(""));
        assert!(!states.check("%%%"));
        let token = states.issue();
        assert!(!states.check(&token[..token.len() / 2]));
    }

    #[test]
    fn test_signed_payload_is_not_a_state() {
        let clock = Arc::new(ManualClock::starting_now());
        let signer = Signer::new([5u8; 32]).unwrap();
        let class = TokenClass::new(signer.clone(), clock.clone(), DEFAULT_STATE_TTL);
        let (with_payload, _) = class.issue(b"x");

        let states = StateTokens::new(signer, clock, DEFAULT_STATE_TTL);
        assert_eq!(states.verify(&with_payload), Err(TokenError::BadPayload));
    }
}
