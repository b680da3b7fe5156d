//! HTTP surface of the analyzer.
//!
//! Endpoints:
//! - `POST /api/analyze` - analyze one page
//! - `GET /healthz` - liveness
//! - `GET /metrics` - Prometheus-compatible metrics
//!
//! Every request passes through the logging/metrics and CORS middleware.

mod handlers;
mod metrics;
mod middleware;
mod types;

use std::net::SocketAddr;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use log::info;

pub use metrics::Metrics;
pub use types::{AppState, ErrorBody};

use crate::analyzer::Analyzer;
use crate::config::{Config, MAX_REQUEST_BODY_BYTES};
use handlers::{analyze_handler, health_handler, method_not_allowed, metrics_handler};

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/analyze",
            post(analyze_handler).fallback(method_not_allowed),
        )
        .route("/healthz", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(axum::middleware::from_fn(middleware::cors))
        .layer(axum::middleware::from_fn_with_state(
            state.metrics.clone(),
            middleware::track_requests,
        ))
        .with_state(state)
}

/// Binds `0.0.0.0:PORT` and serves until Ctrl-C or SIGTERM.
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let analyzer = Analyzer::from_config(config).context("Failed to initialize analyzer")?;
    let app = build_router(AppState::new(analyzer));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to port {}", config.port))?;

    info!("Page analyzer listening on http://{addr}/");
    info!("  - Analyze: POST http://{addr}/api/analyze");
    info!("  - Metrics: http://{addr}/metrics");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown signal received, draining connections");
}
