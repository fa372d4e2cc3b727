//! Header policy for backend proxying
//!
//! Request headers are rewritten before forwarding; response headers are
//! copied back minus hop-by-hop headers.

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use once_cell::sync::Lazy;
use regex::Regex;

use super::BackendOrigin;

/// Hop-by-hop headers that must never be forwarded
const HOP_BY_HOP_HEADERS: &[HeaderName] = &[
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Paths in the authentication subtree
static AUTH_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/api/auth(/|$)").expect("valid auth path pattern"));

/// Fetch metadata sent on authentication requests so the backend treats them
/// as top-level navigations
const AUTH_FETCH_METADATA: [(&str, &str); 3] = [
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "cross-site"),
];

/// Check if a header is a hop-by-hop header that should not be forwarded
pub fn is_hop_by_hop_header(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(name)
}

pub fn is_auth_path(path: &str) -> bool {
    AUTH_PATH.is_match(path)
}

/// Stateless request header rewrite applied before forwarding
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderPolicy;

impl HeaderPolicy {
    /// Compute outbound headers for a request to `path` (API prefix included)
    pub fn apply(&self, path: &str, inbound: &HeaderMap, origin: &BackendOrigin) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(inbound.len() + 4);

        for (name, value) in inbound {
            if !is_hop_by_hop_header(name) {
                headers.append(name.clone(), value.clone());
            }
        }

        if let Ok(host) = HeaderValue::from_str(&origin.domain) {
            headers.insert(header::HOST, host);
        }

        if let Some(own_origin) = inbound_origin(inbound) {
            if !headers.contains_key(header::ORIGIN) {
                headers.insert(header::ORIGIN, own_origin.clone());
            }
            if !headers.contains_key(header::REFERER) {
                headers.insert(header::REFERER, own_origin);
            }
        }

        headers.remove(header::CONTENT_LENGTH);

        if is_auth_path(path) {
            for (name, value) in AUTH_FETCH_METADATA {
                headers.insert(
                    HeaderName::from_static(name),
                    HeaderValue::from_static(value),
                );
            }
            if path.ends_with(".js") {
                headers.insert(
                    header::ACCEPT,
                    HeaderValue::from_static("application/javascript"),
                );
            }
        }

        headers
    }
}

/// `scheme://host` of the inbound request, scheme taken from `X-Forwarded-Proto`
fn inbound_origin(inbound: &HeaderMap) -> Option<HeaderValue> {
    let host = inbound.get(header::HOST)?.to_str().ok()?;
    let scheme = inbound
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");
    HeaderValue::from_str(&format!("{}://{}", scheme, host)).ok()
}

/// Copy backend response headers onto the client response, dropping
/// hop-by-hop headers. Repeated headers such as `Set-Cookie` are kept.
pub fn copy_response_headers(upstream: &HeaderMap, target: &mut HeaderMap) {
    for (name, value) in upstream {
        if !is_hop_by_hop_header(name) {
            target.append(name.clone(), value.clone());
        }
    }
}
