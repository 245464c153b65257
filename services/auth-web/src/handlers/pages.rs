//! Page handler: public files, the sign-in page and the signed-in app

use axum::extract::State;
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use warden_auth_core::GateDecision;

use super::redirect;
use crate::cookies::HeaderCookieJar;
use crate::error::{ApiError, ApiResult};
use crate::site;
use crate::state::AppState;

/// Fallback for every path not owned by another route
pub async fn page(State(state): State<AppState>, mut jar: HeaderCookieJar, uri: Uri) -> Response {
    let path = uri.path();
    let site_dir = &state.config.site_dir;

    if let Some(file) = site::public_file(path) {
        return site::serve_file(site_dir, file).await.into_response();
    }

    let decision = state.gate.authorize(&mut jar);
    metrics::counter!("auth_session_checks_total", "result" => session_check_result(&decision))
        .increment(1);

    let response = match decision {
        GateDecision::Anonymous => site::serve_file(site_dir, site::SIGNIN_PAGE)
            .await
            .into_response(),
        GateDecision::Rejected { user } => ApiError::Forbidden(user).into_response(),
        GateDecision::Authorized { user } => serve_user(&state, &user, path).await.into_response(),
        decision @ GateDecision::Redirect(_) => redirect(decision).into_response(),
    };
    jar.apply(response)
}

async fn serve_user(state: &AppState, user: &str, path: &str) -> ApiResult<Response> {
    tracing::info!("[{user}] {path}");

    if site::is_data_path(path) {
        return site::data_script(&state.config.data_var, user, path).map(site::serve_script);
    }

    match site::protected_file(path) {
        Some(file) => site::serve_file(&state.config.site_dir, file).await,
        None => Err(site::not_found()),
    }
}

/// Metric label for a protected-request decision
fn session_check_result(decision: &GateDecision) -> &'static str {
    match decision {
        GateDecision::Authorized { .. } => "authorized",
        GateDecision::Anonymous => "anonymous",
        GateDecision::Rejected { .. } => "rejected",
        GateDecision::Redirect(_) => "redirect",
    }
}
