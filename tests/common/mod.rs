//! Common test utilities for the sandbox edge proxy
//!
//! Builds the full router over a temporary static root so every test goes
//! through the same middleware stack as production.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum_test::TestServer;
use tempfile::TempDir;

use sandbox_edge::{config::DeploymentEnvironment, routes, AppState, BackendOrigin, Config};

/// Test fixture content
pub mod constants {
    pub const INDEX_HTML: &str =
        "<!doctype html><html><head><title>Sandbox</title></head><body><div id=\"root\"></div></body></html>";
    pub const APP_JS: &str = "console.log('sandbox');";
    pub const APP_CSS: &str = "body { margin: 0; }";
}

/// A running test server plus the static root backing it
pub struct TestApp {
    pub server: TestServer,
    // Held so the directory outlives the server
    pub static_root: TempDir,
}

/// Builder for [`TestApp`]
pub struct TestAppBuilder {
    backend: Option<BackendOrigin>,
    environment: DeploymentEnvironment,
    timeout_seconds: Option<u64>,
    max_body_bytes: Option<usize>,
    with_index: bool,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            backend: None,
            environment: DeploymentEnvironment::Production,
            timeout_seconds: None,
            max_body_bytes: None,
            with_index: true,
        }
    }
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward API calls to `uri` (a wiremock server URI, optionally with a stage path)
    pub fn backend(mut self, uri: &str) -> Self {
        self.backend = Some(BackendOrigin::parse(uri, None).expect("valid backend uri"));
        self
    }

    pub fn environment(mut self, environment: DeploymentEnvironment) -> Self {
        self.environment = environment;
        self
    }

    /// Backend call timeout in seconds
    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout_seconds = Some(secs);
        self
    }

    /// Request body limit in bytes
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = Some(limit);
        self
    }

    /// Leave `index.html` out of the static root
    pub fn without_index(mut self) -> Self {
        self.with_index = false;
        self
    }

    pub fn build(self) -> TestApp {
        let static_root = tempfile::tempdir().expect("create temp dir");
        write_site(static_root.path(), self.with_index);

        let mut config = Config::with_backend(self.backend, static_root.path().to_path_buf());
        config.environment = self.environment;
        if let Some(secs) = self.timeout_seconds {
            config.upstream_timeout_seconds = secs;
        }
        if let Some(limit) = self.max_body_bytes {
            config.max_body_bytes = limit;
        }

        let state = AppState::new(config).expect("build app state");
        let router = routes::create_router(Arc::new(state));
        let server = TestServer::new(router).expect("start test server");

        TestApp {
            server,
            static_root,
        }
    }
}

fn write_site(root: &Path, with_index: bool) {
    if with_index {
        fs::write(root.join("index.html"), constants::INDEX_HTML).expect("write index.html");
    }
    fs::create_dir_all(root.join("assets")).expect("create assets dir");
    fs::write(root.join("assets/app.js"), constants::APP_JS).expect("write app.js");
    fs::write(root.join("assets/app.css"), constants::APP_CSS).expect("write app.css");
    fs::write(root.join("assets/app.js.map"), "{\"version\":3}").expect("write app.js.map");
}

/// App with no backend configured
pub fn app_without_backend() -> TestApp {
    TestAppBuilder::new().build()
}

/// App forwarding to `uri`
pub fn app_with_backend(uri: &str) -> TestApp {
    TestAppBuilder::new().backend(uri).build()
}
