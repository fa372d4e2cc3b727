//! Smoke-test endpoints
//!
//! `/api/test` proves the edge sends API traffic to this service;
//! `/test-direct` proves the service answers outside the API prefix.

use axum::{response::IntoResponse, response::Response, Json};
use serde_json::json;

use super::synthesized::SyntheticRequest;

/// GET /api/test
pub fn api_test(_: &SyntheticRequest<'_>) -> Response {
    Json(json!({
        "message": "API proxy is working",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
    .into_response()
}

/// GET /test-direct
pub fn direct_test(_: &SyntheticRequest<'_>) -> Response {
    Json(json!({
        "message": "Direct route working",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
    .into_response()
}
