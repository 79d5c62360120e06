//! Server — Axum web server for the estimate API.
//!
//! Serves the JSON API and a self-contained HTML landing page.
//! CORS enabled for local development. The estimator already turns provider
//! panics into an error body; a panic anywhere else in a handler becomes a
//! generic 500 so the connection is never dropped silently.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::engine::estimator::panic_message;
use routes::AppState;

/// The embedded landing page (compiled into the binary).
const INDEX_HTML: &str = include_str!("templates/index.html");

/// Body returned for failures outside the estimation pipeline.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again.";

/// Bind and serve until Ctrl+C.
pub async fn serve(state: AppState, cfg: &ServerConfig) -> Result<()> {
    let app = build_router(state);
    let addr = format!("{}:{}", cfg.host, cfg.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(addr = %addr, "Server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down cleanly.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received.");
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // API routes
        .route("/estimate", post(routes::post_estimate))
        .route("/api/procedures", get(routes::get_procedures))
        .route("/api/stats", get(routes::get_stats))
        .route("/health", get(routes::health))
        // Landing page
        .route("/", get(serve_index))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .with_state(state)
}

/// Serve the embedded HTML landing page.
async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic_message(err.as_ref());
    error!(detail, "Unhandled error in request handler");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": UNEXPECTED_ERROR })),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
