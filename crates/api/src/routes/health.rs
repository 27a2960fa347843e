//! Health check handlers. Both answer in the usual envelope.

use axum::{extract::State, http::StatusCode};

use crate::response::ApiResponse;
use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> ApiResponse<()> {
    ApiResponse::message(StatusCode::OK, "ok")
}

/// Readiness health check endpoint.
///
/// Verifies store connectivity before returning OK.
/// Returns 503 Service Unavailable if the store is not reachable.
pub async fn readiness(State(state): State<AppState>) -> ApiResponse<()> {
    match state.item_store().ping().await {
        Ok(()) => ApiResponse::message(StatusCode::OK, "ready"),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            ApiResponse::message(StatusCode::SERVICE_UNAVAILABLE, "Service unavailable.")
        }
    }
}
