//! Warden Auth Core - stateless sign-in gate
//!
//! Signed, time-bounded tokens that need no server-side storage, and the
//! per-request decision logic built on them: anonymous, redirect to the
//! identity provider, rejected, or authorized.
//!
//! Two token classes share one wire format and pipeline:
//! - state tokens (empty payload, minutes) protect the sign-in redirect
//! - session tokens (username payload, days) bind an identity to a browser

pub mod allow_list;
pub mod clock;
pub mod codec;
pub mod config;
pub mod cookie;
pub mod crypto;
pub mod error;
pub mod gate;
pub mod identity;
pub mod session;
pub mod state;
pub mod token;

pub use allow_list::AllowList;
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::AuthConfig;
pub use cookie::{CookieJar, MemoryCookieJar, SESSION_COOKIE};
pub use crypto::{constant_time_eq, Signer, SignerError, TAG_LEN};
pub use error::{AuthError, IdentityError, TokenError};
pub use gate::{AccessGate, GateDecision, APP_ROOT};
pub use identity::{CallbackParams, IdentityProvider};
pub use session::{Session, SessionTokens, DEFAULT_SESSION_TTL};
pub use state::{StateTokens, DEFAULT_STATE_TTL};
pub use token::{TokenClass, VerifiedToken};
