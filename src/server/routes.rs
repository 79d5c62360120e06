//! HTTP route handlers.
//!
//! All endpoints return JSON except `/`. State is shared via `Arc<ServerState>`.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info_span, warn, Instrument};

use crate::engine::estimator::{Estimator, EstimatorStats};
use crate::engine::prompt::known_procedures;
use crate::types::EstimateRequest;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ServerState {
    pub estimator: Estimator,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(estimator: Estimator) -> Self {
        Self {
            estimator,
            started_at: Utc::now(),
        }
    }
}

pub type AppState = Arc<ServerState>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Request-level failures, reported before the estimation pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    /// Body absent, not JSON, or not a non-empty object.
    InvalidRequest,
    /// `procedure` or `zip_code` missing or empty.
    MissingFields,
}

impl ApiError {
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest => "Invalid request data",
            ApiError::MissingFields => "Missing procedure or ZIP code",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": self.message() })),
        )
            .into_response()
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ProceduresResponse {
    pub procedures: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub estimator: EstimatorStats,
    pub uptime_secs: i64,
}

// ---------------------------------------------------------------------------
// Request parsing
// ---------------------------------------------------------------------------

/// Validate a raw `/estimate` body.
///
/// Strings are taken verbatim. Numbers are accepted and rendered as text
/// (clients often send ZIP codes as integers); any other type counts as
/// missing.
pub fn parse_estimate_request(body: &[u8]) -> Result<EstimateRequest, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::InvalidRequest)?;
    let data = match value.as_object() {
        Some(obj) if !obj.is_empty() => obj,
        _ => return Err(ApiError::InvalidRequest),
    };

    let field = |key: &str| -> String {
        match data.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    };

    let procedure = field("procedure");
    let zip_code = field("zip_code");
    if procedure.is_empty() || zip_code.is_empty() {
        return Err(ApiError::MissingFields);
    }

    Ok(EstimateRequest {
        procedure,
        zip_code,
        procedure_code: field("procedure_code"),
    })
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// POST /estimate
///
/// Pipeline failures come back as `200 {"error": ...}`; only malformed
/// requests get a 4xx.
pub async fn post_estimate(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match parse_estimate_request(&body) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = e.message(), "Rejected estimate request");
            return e.into_response();
        }
    };

    let span = info_span!("estimate", request_id = %uuid::Uuid::new_v4());
    let outcome = state.estimator.estimate(&request).instrument(span).await;

    match outcome {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => (StatusCode::OK, Json(json!({ "error": e.user_message() }))).into_response(),
    }
}

/// GET /api/procedures
pub async fn get_procedures() -> Json<ProceduresResponse> {
    Json(ProceduresResponse {
        procedures: known_procedures(),
    })
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        estimator: state.estimator.stats().await,
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
