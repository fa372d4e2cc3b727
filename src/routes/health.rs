//! Liveness endpoint
//!
//! `/health` answers from the proxy alone so load balancer health checks
//! keep passing while the backend is unreachable or unconfigured.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::synthesized::SyntheticRequest;

/// Health status enum
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
}

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: String,
}

/// GET /health
pub fn liveness(_: &SyntheticRequest<'_>) -> Response {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: HealthStatus::Healthy,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    )
        .into_response()
}
