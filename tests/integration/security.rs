//! Security header and CORS integration tests

use axum::http::{Method, StatusCode};
use serde_json::json;

use sandbox_edge::middleware::security_headers::RESPONSE_HEADERS;

use crate::common;
use crate::mocks::MockBackend;

fn assert_policy_headers(response: &axum_test::TestResponse, route: &str) {
    for (name, value) in RESPONSE_HEADERS {
        assert_eq!(
            response.headers().get(name).map(|v| v.to_str().unwrap()),
            Some(value),
            "header {} on {}",
            name,
            route
        );
    }
}

#[tokio::test]
async fn test_policy_headers_on_every_response_kind() {
    let backend = MockBackend::start().await;
    backend.mock_json("GET", "/api/leases", 200, json!([])).await;
    let app = common::app_with_backend(&backend.uri());

    for route in [
        "/health",
        "/api/test",
        "/api/leases",
        "/assets/app.css",
        "/assets/missing.png",
        "/main.js.map",
        "/leases/1",
    ] {
        let response = app.server.get(route).await;
        assert_policy_headers(&response, route);
    }
}

#[tokio::test]
async fn test_policy_headers_on_errors() {
    let app = common::app_without_backend();

    let response = app.server.get("/api/leases").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_policy_headers(&response, "/api/leases");
}

#[tokio::test]
async fn test_preflight_answered_without_backend() {
    let backend = MockBackend::start().await;
    let app = common::app_with_backend(&backend.uri());

    for route in ["/api/leases", "/anything/at/all", "/health"] {
        let response = app.server.method(Method::OPTIONS, route).await;
        response.assert_status_ok();
        assert!(response.text().is_empty());
        assert_policy_headers(&response, route);
    }

    assert!(backend.received_requests().await.is_empty());
}
