//! Request pipeline
//!
//! Every request that is not an `OPTIONS` preflight lands here. The request
//! is captured, a routing decision is made, and exactly one response is
//! produced: synthesized, forwarded to the backend, or served from the
//! static root.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::Method,
    response::{IntoResponse, Response},
};
use tracing::{debug, info, warn};

use crate::{
    edge::{has_file_extension, EdgeRouter, EdgeTarget},
    error::{AppError, AppResult},
    metrics::{record_request, record_upstream_error},
    proxy::ProxiedRequest,
    AppState,
};

use super::synthesized::{SyntheticEndpoint, SyntheticRegistry, SyntheticRequest};

/// Routing decision for a captured request
pub enum Decision<'a> {
    Synthesized(&'a SyntheticEndpoint),
    Forward,
    Asset,
    SpaEntry,
}

impl Decision<'_> {
    /// Metric label
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Synthesized(endpoint) => endpoint.name,
            Decision::Forward => "forward",
            Decision::Asset => "asset",
            Decision::SpaEntry => "spa",
        }
    }
}

/// Decide how to answer `method path`. Registry entries (source maps first)
/// take priority over the API prefix, which takes priority over assets.
pub fn decide<'a>(registry: &'a SyntheticRegistry, method: &Method, path: &str) -> Decision<'a> {
    if let Some(endpoint) = registry.find(method, path) {
        return Decision::Synthesized(endpoint);
    }

    match EdgeRouter.dispatch(path) {
        EdgeTarget::Api => Decision::Forward,
        EdgeTarget::Liveness | EdgeTarget::Asset if has_file_extension(path) => Decision::Asset,
        EdgeTarget::Liveness | EdgeTarget::Asset => Decision::SpaEntry,
    }
}

/// Fallback handler for every path
pub async fn handle(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let (route, response) = match process(&state, request).await {
        Ok(result) => result,
        Err(e) => {
            if matches!(e, AppError::Transport(_) | AppError::MissingConfiguration) {
                record_upstream_error(e.kind());
            }
            warn!(method = %method, path = %path, error = %e, "Request failed");
            ("error", e.into_response())
        }
    };

    let duration = start.elapsed().as_secs_f64();
    record_request(route, response.status().as_u16(), duration);
    debug!(
        method = %method,
        path = %path,
        route = route,
        status = %response.status(),
        duration_ms = %format!("{:.2}", duration * 1000.0),
        "Request completed"
    );

    response
}

async fn process(state: &AppState, request: Request) -> AppResult<(&'static str, Response)> {
    let captured = ProxiedRequest::capture(request, state.config.max_body_bytes).await?;
    let decision = decide(&state.registry, &captured.method, &captured.full_path);
    let route = decision.label();

    let response = match decision {
        Decision::Synthesized(endpoint) => {
            let ctx = SyntheticRequest {
                config: &state.config,
                request: &captured,
            };
            (endpoint.generate)(&ctx)
        }
        Decision::Forward => {
            let start = Instant::now();
            let method = captured.method.clone();
            let path = captured.full_path.clone();
            let response = state.backend.forward(captured).await?;
            info!(
                method = %method,
                path = %path,
                status = %response.status(),
                duration_ms = %format!("{:.2}", start.elapsed().as_secs_f64() * 1000.0),
                "Backend request completed"
            );
            response
        }
        Decision::Asset => {
            state
                .static_site
                .serve_asset(&captured.method, &captured.full_path, &captured.headers)
                .await
        }
        Decision::SpaEntry => state.static_site.serve_entry().await,
    };

    Ok((route, response))
}
