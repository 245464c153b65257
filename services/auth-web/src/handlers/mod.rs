//! HTTP handlers

mod auth;
mod health;
mod pages;

use axum::response::Redirect;
use warden_auth_core::GateDecision;

use crate::error::{ApiError, ApiResult};

pub use auth::{callback, sign_in, sign_out};
pub use health::health;
pub use pages::page;

/// Turn a redirect decision into a response
fn redirect(decision: GateDecision) -> ApiResult<Redirect> {
    match decision {
        GateDecision::Redirect(url) => Ok(Redirect::to(&url)),
        other => Err(ApiError::Internal(format!(
            "expected a redirect, gate decided {other:?}"
        ))),
    }
}
