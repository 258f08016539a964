//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (panel has rendered at least once)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 once a refresh cycle has succeeded.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.dashboard.is_ready().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
///
/// Full health status with refresh details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let refresh = state.dashboard.stats().await;

    // A failing source still serves the last good panel
    let status = match (refresh.successes, &refresh.last_error) {
        (0, _) => "starting",
        (_, Some(_)) => "degraded",
        (_, None) => "healthy",
    };

    Json(HealthResponse {
        status: status.to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        refresh,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }
}
