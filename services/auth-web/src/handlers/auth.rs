//! Sign-in handlers (signin, callback, signout)

use std::time::Instant;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use warden_auth_core::{AuthError, CallbackParams, GateDecision};

use super::redirect;
use crate::cookies::HeaderCookieJar;
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /github/signin
///
/// Send the browser to GitHub with a fresh state token
pub async fn sign_in(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    metrics::counter!("auth_sign_in_redirects_total").increment(1);
    redirect(state.gate.sign_in())
}

/// GET /github/callback?code=..&state=..
///
/// Finish sign-in and set the session cookie
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    mut jar: HeaderCookieJar,
) -> ApiResult<Response> {
    let start = Instant::now();
    let result = state.gate.callback(&params, &mut jar).await;

    metrics::counter!("auth_sign_ins_total", "result" => sign_in_result(&result)).increment(1);
    metrics::histogram!("auth_sign_in_duration_seconds")
        .record(start.elapsed().as_secs_f64());

    Ok(jar.apply(redirect(result?)?))
}

/// GET /github/signout
///
/// Clear the session cookie and go back to the front page
pub async fn sign_out(
    State(state): State<AppState>,
    mut jar: HeaderCookieJar,
) -> ApiResult<Response> {
    let decision = state.gate.sign_out(&mut jar);
    metrics::counter!("auth_sign_outs_total").increment(1);
    Ok(jar.apply(redirect(decision)?))
}

/// Metric label for a finished callback
fn sign_in_result(result: &Result<GateDecision, AuthError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(AuthError::NotAuthorized(_)) => "unauthorized",
        Err(AuthError::InvalidState) => "invalid_state",
        Err(AuthError::IdentityExchange(_)) => "exchange_failed",
        Err(AuthError::Configuration(_)) => "error",
    }
}
