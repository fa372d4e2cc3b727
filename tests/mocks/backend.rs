//! Mock backend API server for testing
//!
//! Wraps a wiremock server standing in for the serverless API origin.
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = MockBackend::start().await;
//! backend.mock_json("GET", "/api/leases", 200, json!([])).await;
//! let app = common::app_with_backend(&backend.uri());
//! ```

use std::time::Duration;

use serde_json::Value;
use wiremock::{
    matchers::{body_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

/// Mock backend API server wrapper
pub struct MockBackend {
    server: MockServer,
}

impl MockBackend {
    /// Start a new mock backend
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Base URI, usable as `API_ENDPOINT`
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Authority (`host:port`) the proxy should send as `Host`
    pub fn authority(&self) -> String {
        self.server.address().to_string()
    }

    /// All requests received so far
    pub async fn received_requests(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Respond to `verb path` with a JSON body and the given status
    pub async fn mock_json(&self, verb: &str, route: &str, status: u16, body: Value) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Respond to `GET path` with a redirect
    pub async fn mock_redirect(&self, route: &str, status: u16, location: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).insert_header("Location", location))
            .mount(&self.server)
            .await;
    }

    /// Respond to a script request under the auth subtree, but only when the
    /// proxy sent the headers the auth flow relies on
    pub async fn mock_auth_script(&self, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("accept", "application/javascript"))
            .and(header("sec-fetch-dest", "document"))
            .and(header("sec-fetch-mode", "navigate"))
            .and(header("sec-fetch-site", "cross-site"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "application/javascript")
                    .set_body_string(body),
            )
            .mount(&self.server)
            .await;
    }

    /// Respond to `verb path` with a plain-text body and an extra header
    pub async fn mock_text_with_header(
        &self,
        verb: &str,
        route: &str,
        body: &str,
        header_name: &str,
        header_value: &str,
    ) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(header_name, header_value)
                    .set_body_string(body),
            )
            .mount(&self.server)
            .await;
    }

    /// Respond with `status` only when the forwarded JSON body equals `expected`
    pub async fn mock_expect_json_body(&self, verb: &str, route: &str, expected: Value, status: u16) {
        Mock::given(method(verb))
            .and(path(route))
            .and(body_json(expected))
            .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({ "ok": true })))
            .mount(&self.server)
            .await;
    }

    /// Respond only when the query parameter made it through
    pub async fn mock_expect_query(&self, route: &str, key: &str, value: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .and(query_param(key, value))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Respond to `GET path` only after `delay`
    pub async fn mock_slow(&self, route: &str, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(delay)
                    .set_body_json(serde_json::json!({ "late": true })),
            )
            .mount(&self.server)
            .await;
    }

    /// Accept any `POST path`, so tests can inspect the forwarded bytes
    pub async fn mock_accept_post(&self, route: &str) {
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(201))
            .mount(&self.server)
            .await;
    }
}
