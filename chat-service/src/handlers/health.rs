//! Liveness and readiness probes.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::models::turn::iso_timestamp;
use crate::startup::AppState;

/// Service name reported by the liveness probe.
pub const SERVICE_NAME: &str = "chat-service";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}

/// Liveness probe. Touches no dependency and needs no identity.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            service: SERVICE_NAME,
            timestamp: iso_timestamp(Utc::now()),
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Readiness probe: ready once the history store answers.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.history.health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => {
            tracing::warn!(error = %e, "History store not ready");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
