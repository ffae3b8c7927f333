use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::error::{GatewayError, GatewayResult};
use crate::state::GatewayState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub fn create_health_routes() -> Router<Arc<GatewayState>> {
    Router::new().route("/health", get(health_check))
}

/// Liveness probe; not behind the access interceptor.
pub async fn health_check(
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<Json<HealthResponse>> {
    state.database().test_connection().await.map_err(|e| {
        warn!(error = %e, "health check failed");
        GatewayError::ServiceUnavailable
    })?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    }))
}
