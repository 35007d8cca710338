//! GET /validation/health and GET /validation/metrics. Unauthenticated.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::{ApiError, Result};
use crate::state::{AppState, MetricsSnapshot};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

/// Liveness probe. Datastore unreachable surfaces as 503, not masked.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    state
        .db
        .ping()
        .map_err(|e| ApiError::Unavailable(format!("database unreachable: {e}")))?;

    Ok(Json(HealthResponse {
        status: "ok",
        database: "reachable",
    }))
}

/// Placeholder process counters.
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
