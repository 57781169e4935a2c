use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::api::AppState;

/// Readiness response
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Dispatch strategy serving requests
    pub strategy: String,
}

pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

/// GET /health/live - Liveness probe
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}

/// GET /health/ready - Readiness probe
///
/// The planner has no downstream dependencies, so it is ready as soon as the
/// optimizer has been built from configuration.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let response = ReadinessResponse {
        status: "ready".to_string(),
        timestamp: chrono::Utc::now(),
        strategy: state.optimizer.strategy_name().to_string(),
    };
    (StatusCode::OK, Json(response))
}
