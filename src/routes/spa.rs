//! Frontend asset serving
//!
//! Files with an extension come from the static root through
//! `tower_http::services::ServeDir`. Everything else gets the SPA entry
//! document so client-side routes survive a reload.

use std::path::PathBuf;

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::error;

use crate::edge::SPA_ENTRY;

/// Static frontend rooted at a directory
#[derive(Debug, Clone)]
pub struct StaticSite {
    root: PathBuf,
}

impl StaticSite {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Serve a file under the root. Missing files are a plain 404.
    pub async fn serve_asset(&self, method: &Method, path: &str, headers: &HeaderMap) -> Response {
        let mut request = Request::new(Body::empty());
        *request.method_mut() = method.clone();
        *request.headers_mut() = headers.clone();
        match path.parse() {
            Ok(uri) => *request.uri_mut() = uri,
            Err(_) => return not_found(),
        }

        let response = match ServeDir::new(&self.root).oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };

        if response.status() == StatusCode::NOT_FOUND {
            return not_found();
        }
        response.map(Body::new)
    }

    /// Serve the SPA entry document
    pub async fn serve_entry(&self) -> Response {
        let entry = self.root.join(SPA_ENTRY.trim_start_matches('/'));
        match tokio::fs::read(&entry).await {
            Ok(contents) => (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/html; charset=utf-8"),
                    (header::CACHE_CONTROL, "no-cache"),
                ],
                contents,
            )
                .into_response(),
            Err(e) => {
                error!(
                    path = %entry.display(),
                    error = %e,
                    "SPA entry document is missing; check STATIC_DIR"
                );
                not_found()
            }
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}
