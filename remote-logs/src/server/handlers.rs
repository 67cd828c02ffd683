//! HTTP route handlers for the log server.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use super::error::ApiError;
use super::metrics::Metrics;
use super::request::FetchRequest;
use super::response::ApiResponse;
use crate::auth::CredentialValidator;
use crate::model::LogBatch;
use crate::query::CursorQueryEngine;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: CursorQueryEngine,
    pub validator: Arc<dyn CredentialValidator>,
    pub metrics: Arc<Metrics>,
}

/// Handle POST /api/v1/logs (and the legacy /api.php alias).
///
/// The body is checked and the caller authenticated before the store is
/// touched. Every outcome is a complete JSON envelope.
pub async fn handle_fetch_logs(State(state): State<AppState>, body: Bytes) -> Response {
    match fetch_logs(&state, &body).await {
        Ok(batch) => {
            state
                .metrics
                .log_records_served_total
                .inc_by(batch.count as u64);
            ApiResponse::success(batch).into_response()
        }
        Err(err) => {
            if err.is_client_error() {
                tracing::debug!(code = err.code(), "rejected log fetch request");
            }
            state.metrics.record_failure(err.code());
            err.into_response()
        }
    }
}

async fn fetch_logs(state: &AppState, body: &[u8]) -> Result<LogBatch, ApiError> {
    let request = FetchRequest::from_body(body)?;

    let secret = request.secret_key()?;
    if !state.validator.validate(secret) {
        return Err(ApiError::InvalidSecretKey);
    }

    let options = request.fetch_options()?;
    let batch = state
        .engine
        .fetch_with_options(request.cursor(), options)
        .await?;

    Ok(batch.with_last_id_requested(request.last_id()))
}

/// Fallback for any non-POST method on the pull endpoint.
pub async fn handle_method_not_allowed(State(state): State<AppState>) -> ApiError {
    let err = ApiError::MethodNotAllowed;
    state.metrics.record_failure(err.code());
    err
}

/// Handle GET /
///
/// Describes the service and its endpoints.
pub async fn handle_index() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Remote logs API is running",
        "endpoints": {
            "POST /api/v1/logs": "Retrieve log records newer than last_id",
            "POST /api.php": "Alias of /api/v1/logs",
            "GET /metrics": "Prometheus metrics",
            "GET /-/healthy": "Liveness probe",
            "GET /-/ready": "Readiness probe (checks the log store)",
        },
        "required_fields": {
            "secret_key": "API authentication key",
        },
        "optional_fields": {
            "last_id": "Last record id already consumed (default 0)",
            "limit": "Maximum number of records to return",
        },
    }))
}

/// Handle GET /metrics
pub async fn handle_metrics(State(state): State<AppState>) -> String {
    state.metrics.encode()
}

/// Handle GET /-/healthy
pub async fn handle_healthy() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Handle GET /-/ready
///
/// Ready once the log store answers a query.
pub async fn handle_ready(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.engine.check_store().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::warn!(error = %e, "log store not ready");
            (StatusCode::SERVICE_UNAVAILABLE, "log store unavailable")
        }
    }
}
