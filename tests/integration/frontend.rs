//! Static frontend integration tests
//!
//! - Unknown extensionless paths serve the SPA entry document
//! - Paths with an extension are looked up under the static root
//! - Source maps are never served

use axum::http::{header, StatusCode};

use crate::common::{self, constants, TestAppBuilder};

#[tokio::test]
async fn test_client_routes_serve_index() {
    let app = common::app_without_backend();

    for route in ["/", "/leases", "/leases/123/details", "/admin/accounts"] {
        let response = app.server.get(route).await;
        response.assert_status_ok();
        assert_eq!(response.text(), constants::INDEX_HTML, "route {}", route);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
    }
}

#[tokio::test]
async fn test_spa_fallback_is_idempotent() {
    let app = common::app_without_backend();

    let first = app.server.get("/leases/abc").await;
    let second = app.server.get("/leases/abc").await;

    assert_eq!(first.status_code(), second.status_code());
    assert_eq!(first.text(), second.text());
}

#[tokio::test]
async fn test_asset_served_from_static_root() {
    let app = common::app_without_backend();

    let response = app.server.get("/assets/app.css").await;
    response.assert_status_ok();
    assert_eq!(response.text(), constants::APP_CSS);

    let response = app.server.get("/assets/app.js?v=42").await;
    response.assert_status_ok();
    assert_eq!(response.text(), constants::APP_JS);
}

#[tokio::test]
async fn test_missing_asset_is_not_found() {
    let app = common::app_without_backend();

    let response = app.server.get("/assets/missing.png").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.text(), "Not found");
}

#[tokio::test]
async fn test_source_maps_never_served() {
    let app = common::app_without_backend();

    // The file exists on disk; it still must not be served
    for route in ["/assets/app.js.map", "/main.js.map?v=3", "/api/app.js.map"] {
        let response = app.server.get(route).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.text(), "Source map not available", "route {}", route);
    }
}

#[tokio::test]
async fn test_missing_index_is_not_found() {
    let app = TestAppBuilder::new().without_index().build();

    let response = app.server.get("/leases").await;
    response.assert_status(StatusCode::NOT_FOUND);
}
