//! HTTP routes for the edge proxy
//!
//! All paths go through one fallback handler; routing decisions live in the
//! pipeline so synthesized endpoints, forwarding and static assets share a
//! single ordered decision.

pub mod auth;
pub mod debug;
#[cfg(feature = "dev-login")]
pub mod dev_login;
pub mod health;
pub mod pipeline;
pub mod smoke;
pub mod spa;
pub mod synthesized;

use std::sync::Arc;

use axum::{middleware, Router};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{error::handle_panic, middleware::security_headers::security_headers, AppState};

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Layers run outermost-last: security headers wrap everything, including
    // the 500 produced for a panicking handler
    Router::new()
        .fallback(pipeline::handle)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}
