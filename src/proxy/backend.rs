//! Backend API client
//!
//! Forwards API requests to the serverless backend and streams the answer
//! back unchanged.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Response, StatusCode};
use tracing::{debug, error, info, instrument};

use super::headers::{copy_response_headers, HeaderPolicy};
use super::{BackendOrigin, ProxiedRequest};
use crate::error::{AppError, AppResult};

/// Client for the backend origin
///
/// The underlying `reqwest::Client` does not follow redirects (the caller's
/// browser must see them) and does not verify the backend's TLS certificate.
/// That relaxed trust is limited to this client.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    origin: Option<BackendOrigin>,
    policy: HeaderPolicy,
}

impl BackendClient {
    /// Create a new backend client
    pub fn new(origin: Option<BackendOrigin>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .pool_max_idle_per_host(100)
            .build()?;

        Ok(Self {
            client,
            origin,
            policy: HeaderPolicy,
        })
    }

    /// Check if a backend origin is configured
    pub fn is_configured(&self) -> bool {
        self.origin.is_some()
    }

    /// Forward a captured request to the backend
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.full_path))]
    pub async fn forward(&self, request: ProxiedRequest) -> AppResult<Response<Body>> {
        let origin = self.origin.as_ref().ok_or(AppError::MissingConfiguration)?;

        let backend_path = request.backend_path();
        let url = origin.url_for(&backend_path, request.query.as_deref());
        let headers = self.policy.apply(&backend_path, &request.headers, origin);
        let body = request.body.to_bytes();

        info!(url = %url, method = %request.method, "Forwarding request to backend");
        debug!(
            url = %url,
            declared_length = ?request.content_length,
            body_len = body.len(),
            "Outbound request prepared"
        );

        let mut builder = self.client.request(request.method.clone(), &url).headers(headers);
        if !body.is_empty() {
            builder = builder.body(body);
        }
        let outbound = builder
            .build()
            .map_err(|e| AppError::RequestSetup(e.to_string()))?;

        let response = self.client.execute(outbound).await.map_err(|e| {
            error!(url = %url, error = %e, "Failed to reach backend");
            AppError::Transport(e)
        })?;

        debug!(url = %url, status = %response.status(), "Received response from backend");

        convert_response(response)
    }
}

/// Convert a reqwest response into an axum response, status passed verbatim
fn convert_response(response: reqwest::Response) -> AppResult<Response<Body>> {
    let status = StatusCode::from_u16(response.status().as_u16())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut out = Response::builder()
        .status(status)
        .body(Body::empty())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))?;

    copy_response_headers(response.headers(), out.headers_mut());

    *out.body_mut() = Body::from_stream(response.bytes_stream());
    Ok(out)
}
