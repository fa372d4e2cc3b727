//! Security and CORS response headers
//!
//! Applied to every response the service produces. `OPTIONS` requests are
//! answered here with an empty 200 and never reach the pipeline.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
script-src 'self' https://*.amazonaws.com; \
style-src 'self' 'unsafe-inline' https://*.amazonaws.com; \
connect-src 'self' https://*.amazonaws.com; \
img-src 'self' data:; \
frame-ancestors 'none'";

/// Headers added to every response
pub const RESPONSE_HEADERS: [(&str, &str); 7] = [
    ("content-security-policy", CONTENT_SECURITY_POLICY),
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("access-control-allow-origin", "*"),
    (
        "access-control-allow-methods",
        "GET, POST, PUT, DELETE, PATCH, OPTIONS",
    ),
    (
        "access-control-allow-headers",
        "Content-Type, Authorization, X-Requested-With",
    ),
];

/// Insert the policy headers. Values already present on the response (for
/// example copied from the backend) are left alone.
pub fn apply_response_headers(headers: &mut HeaderMap) {
    for (name, value) in RESPONSE_HEADERS {
        headers
            .entry(HeaderName::from_static(name))
            .or_insert_with(|| HeaderValue::from_static(value));
    }
}

/// Security headers middleware
pub async fn security_headers(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::OK.into_response();
        apply_response_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_response_headers(response.headers_mut());
    response
}
