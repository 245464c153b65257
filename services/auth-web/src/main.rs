//! Warden Auth Web
//!
//! Serves a private static site to an allow-list of GitHub users. Sessions
//! live entirely in a signed cookie, so the service keeps no per-user state.
//!
//! ## Sign-in Endpoints
//!
//! - `GET /github/signin` - Redirect to GitHub
//! - `GET /github/callback` - GitHub OAuth callback, sets the session cookie
//! - `GET /github/signout` - Clear the session cookie
//!
//! ## Site
//!
//! - `/assets/*`, `/favicon.ico`, `/style.css` - Public
//! - `/`, `/proj.html`, `/file.html`, `/js/*.js`, `/data/proj.js` - Signed-in users
//! - Anything else without a session gets the sign-in page
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /metrics` - Prometheus metrics

mod config;
mod cookies;
mod error;
mod github;
mod handlers;
mod router;
mod site;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use warden_auth_core::{AccessGate, SystemClock};

use crate::config::Config;
use crate::github::GitHubProvider;
use crate::router::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("auth_web=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Warden Auth Web");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        site_dir = %config.site_dir.display(),
        allowed_users = config.auth.users.len(),
        "Configuration loaded"
    );
    if config.auth.state_key.is_none() || config.auth.session_key.is_none() {
        tracing::warn!("Signing key not configured, generated one; sessions end on restart");
    }

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    // Identity provider
    let github = GitHubProvider::new(
        config.github_client_id.clone(),
        config.github_client_secret.clone(),
        config.request_timeout,
    )?;

    // Access gate
    let gate = AccessGate::new(&config.auth, Arc::new(SystemClock), Arc::new(github))?;

    // Create application state
    let http_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let state = AppState::new(gate, config);

    // Build HTTP router
    let app = build_router(state, metrics_handle);

    run_http_server(app, http_addr).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn run_http_server(app: axum::Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Sign-in waits on two GitHub round trips
    let sign_in_buckets = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("auth_sign_in_duration_seconds".to_string()),
            sign_in_buckets,
        )?
        .install_recorder()?;

    metrics::describe_counter!(
        "auth_sign_in_redirects_total",
        "Browsers sent to GitHub to sign in"
    );
    metrics::describe_counter!(
        "auth_sign_ins_total",
        "Sign-in callbacks by result (ok, unauthorized, invalid_state, exchange_failed)"
    );
    metrics::describe_counter!(
        "auth_session_checks_total",
        "Protected requests by result (authorized, anonymous, rejected)"
    );
    metrics::describe_counter!("auth_sign_outs_total", "Total sign-outs");
    metrics::describe_histogram!(
        "auth_sign_in_duration_seconds",
        "Sign-in callback latency in seconds, including the GitHub exchange"
    );

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
