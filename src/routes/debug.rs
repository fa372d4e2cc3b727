//! Diagnostic echo endpoint
//!
//! Returns the resolved backend configuration and the headers the proxy
//! received, which is what an operator needs when the load balancer or CDN
//! rewrites something unexpectedly.

use std::collections::BTreeMap;

use axum::{response::IntoResponse, response::Response, Json};
use serde::Serialize;

use super::synthesized::SyntheticRequest;

/// Config echo (non-sensitive)
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub api_endpoint: Option<String>,
    pub stage_path: Option<String>,
    pub backend_configured: bool,
    pub environment: &'static str,
    pub static_dir: String,
    pub upstream_timeout_seconds: u64,
    pub version: &'static str,
    pub method: String,
    pub path: String,
    pub headers: BTreeMap<String, Vec<String>>,
}

/// GET /debug
pub fn echo(req: &SyntheticRequest<'_>) -> Response {
    let config = req.config;
    let backend = config.backend.as_ref();

    let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in &req.request.headers {
        headers
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }

    Json(DebugInfo {
        api_endpoint: backend.map(|b| format!("{}://{}", b.scheme, b.domain)),
        stage_path: backend.and_then(|b| b.stage_path.clone()),
        backend_configured: backend.is_some(),
        environment: config.environment.as_str(),
        static_dir: config.static_dir.display().to_string(),
        upstream_timeout_seconds: config.upstream_timeout_seconds,
        version: env!("CARGO_PKG_VERSION"),
        method: req.request.method.to_string(),
        path: req.request.full_path.clone(),
        headers,
    })
    .into_response()
}
