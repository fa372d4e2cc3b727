//! Backend forwarding integration tests
//!
//! Tests for everything under `/api/*` that is not synthesized:
//! - status, headers and body passed through verbatim
//! - redirects handed to the caller, never followed
//! - stage path prefixed to the backend URL
//! - auth subtree header policy
//! - missing, unreachable or slow backend
//! - request body size limit

use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use bytes::Bytes;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{self, TestAppBuilder};
use crate::mocks::MockBackend;

#[tokio::test]
async fn test_backend_json_passthrough() {
    let backend = MockBackend::start().await;
    backend
        .mock_json("GET", "/api/leases", 200, json!([{ "leaseId": "l-1" }]))
        .await;
    let app = common::app_with_backend(&backend.uri());

    let response = app.server.get("/api/leases").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!([{ "leaseId": "l-1" }]));
}

#[tokio::test]
async fn test_backend_error_status_passed_through() {
    let backend = MockBackend::start().await;
    backend.mock_json("GET", "/api/x", 503, json!({ "x": 1 })).await;
    let app = common::app_with_backend(&backend.uri());

    let response = app.server.get("/api/x").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json::<Value>(), json!({ "x": 1 }));
}

#[tokio::test]
async fn test_redirect_not_followed() {
    let backend = MockBackend::start().await;
    backend
        .mock_redirect("/api/auth/login", 302, "https://idp.example.com/sso?state=abc")
        .await;
    let app = common::app_with_backend(&backend.uri());

    let response = app.server.get("/api/auth/login").await;
    response.assert_status(StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://idp.example.com/sso?state=abc"
    );
    assert_eq!(backend.received_requests().await.len(), 1);
}

#[tokio::test]
async fn test_stage_path_applied() {
    let backend = MockBackend::start().await;
    backend
        .mock_json("GET", "/prod/api/accounts", 200, json!({ "stage": "prod" }))
        .await;
    let app = common::app_with_backend(&format!("{}/prod/", backend.uri()));

    let response = app.server.get("/api/accounts").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["stage"], "prod");
}

#[tokio::test]
async fn test_query_string_forwarded() {
    let backend = MockBackend::start().await;
    backend
        .mock_expect_query("/api/leases", "status", "Active", json!({ "filtered": true }))
        .await;
    let app = common::app_with_backend(&backend.uri());

    let response = app.server.get("/api/leases?status=Active").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["filtered"], true);
}

#[tokio::test]
async fn test_json_body_forwarded() {
    let backend = MockBackend::start().await;
    let payload = json!({ "leaseTemplateUuid": "t-1", "comments": "demo" });
    backend
        .mock_expect_json_body("POST", "/api/leases", payload.clone(), 201)
        .await;
    let app = common::app_with_backend(&backend.uri());

    let response = app.server.post("/api/leases").json(&payload).await;
    response.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_invalid_json_body_rejected() {
    let backend = MockBackend::start().await;
    let app = common::app_with_backend(&backend.uri());

    let response = app
        .server
        .post("/api/leases")
        .content_type("application/json")
        .bytes(Bytes::from_static(b"{not json"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(backend.received_requests().await.is_empty());
}

#[tokio::test]
async fn test_auth_script_gets_javascript_accept_and_fetch_metadata() {
    let backend = MockBackend::start().await;
    backend
        .mock_auth_script("/api/auth/callback.js", "window.done = true;")
        .await;
    let app = common::app_with_backend(&backend.uri());

    // The browser asked for HTML; the backend only answers when the proxy
    // rewrote the headers
    let response = app
        .server
        .get("/api/auth/callback.js")
        .add_header(header::ACCEPT, HeaderValue::from_static("text/html"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.text(), "window.done = true;");
}

#[tokio::test]
async fn test_host_and_origin_rewritten() {
    let backend = MockBackend::start().await;
    backend.mock_json("GET", "/api/usage", 200, json!({})).await;
    let app = common::app_with_backend(&backend.uri());

    app.server
        .get("/api/usage")
        .add_header(header::HOST, HeaderValue::from_static("sandbox.example.com"))
        .add_header(
            HeaderName::from_static("x-forwarded-proto"),
            HeaderValue::from_static("https"),
        )
        .await
        .assert_status_ok();

    let requests = backend.received_requests().await;
    assert_eq!(requests.len(), 1);
    let headers = &requests[0].headers;
    assert_eq!(headers.get("host").unwrap(), backend.authority().as_str());
    assert_eq!(headers.get("origin").unwrap(), "https://sandbox.example.com");
    assert_eq!(headers.get("referer").unwrap(), "https://sandbox.example.com");
    assert!(headers.get("sec-fetch-site").is_none());
}

#[tokio::test]
async fn test_missing_backend_is_configuration_error() {
    let app = common::app_without_backend();

    let response = app.server.get("/api/x").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = response.json();
    assert!(json["message"].as_str().unwrap().contains("API_ENDPOINT"));

    // Liveness is unaffected
    app.server.get("/health").await.assert_status_ok();
}

#[tokio::test]
async fn test_unreachable_backend_is_bad_gateway() {
    // Nothing listens on port 1
    let app = common::app_with_backend("http://127.0.0.1:1");

    let response = app.server.get("/api/leases").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let json: Value = response.json();
    assert_eq!(json["message"], "Proxy error");
    assert!(!json["error"].as_str().unwrap().is_empty());
    assert_eq!(json["details"], "Could not connect to the backend API");
}

#[tokio::test]
async fn test_backend_timeout_is_bad_gateway() {
    let backend = MockBackend::start().await;
    backend.mock_slow("/api/slow", Duration::from_secs(3)).await;
    let app = TestAppBuilder::new().backend(&backend.uri()).timeout(1).build();

    let response = app.server.get("/api/slow").await;
    response.assert_status(StatusCode::BAD_GATEWAY);

    let json: Value = response.json();
    assert_eq!(json["message"], "Proxy error");
    assert!(!json["error"].as_str().unwrap().is_empty());
    assert_eq!(json["details"], "Backend did not respond before the timeout");
}

#[tokio::test]
async fn test_json_body_forwarded_unchanged() {
    let backend = MockBackend::start().await;
    backend.mock_accept_post("/api/leases").await;
    let app = common::app_with_backend(&backend.uri());

    let raw = r#"{"zeta":1,"alpha":2,"amount":12345678901234567890123,"price":1.10}"#;
    app.server
        .post("/api/leases")
        .content_type("application/json")
        .bytes(Bytes::from_static(raw.as_bytes()))
        .await
        .assert_status(StatusCode::CREATED);

    let requests = backend.received_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(String::from_utf8_lossy(&requests[0].body), raw);
}

#[tokio::test]
async fn test_oversized_body_is_payload_too_large() {
    let backend = MockBackend::start().await;
    backend.mock_accept_post("/api/uploads").await;
    let app = TestAppBuilder::new()
        .backend(&backend.uri())
        .max_body_bytes(32)
        .build();

    let response = app
        .server
        .post("/api/uploads")
        .content_type("text/plain")
        .bytes(Bytes::from(vec![b'x'; 256]))
        .await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert!(backend.received_requests().await.is_empty());
}

#[tokio::test]
async fn test_backend_headers_win_over_policy_headers() {
    let backend = MockBackend::start().await;
    backend
        .mock_text_with_header(
            "GET",
            "/api/embed",
            "ok",
            "x-frame-options",
            "SAMEORIGIN",
        )
        .await;
    let app = common::app_with_backend(&backend.uri());

    let response = app.server.get("/api/embed").await;
    response.assert_status_ok();
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "SAMEORIGIN");
    assert_eq!(response.headers().get("x-content-type-options").unwrap(), "nosniff");
}
