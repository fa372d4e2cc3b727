//! Synthesized endpoint registry
//!
//! Endpoints answered by the proxy itself, never forwarded to the backend.
//! The table is built once at startup; lookups walk it in order and the
//! first matching entry wins.

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::config::Config;
use crate::proxy::ProxiedRequest;

use super::{auth, debug, health, smoke};

/// Inputs available to a response generator
pub struct SyntheticRequest<'a> {
    pub config: &'a Config,
    pub request: &'a ProxiedRequest,
}

/// Pure response generator
pub type Generator = fn(&SyntheticRequest<'_>) -> Response;

#[derive(Debug, Clone)]
pub enum MethodMatcher {
    Any,
    /// A single method. `GET` entries also answer `HEAD`.
    Only(Method),
}

impl MethodMatcher {
    fn matches(&self, method: &Method) -> bool {
        match self {
            MethodMatcher::Any => true,
            MethodMatcher::Only(expected) => {
                expected == method || (*expected == Method::GET && *method == Method::HEAD)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum PathMatcher {
    Exact(&'static str),
    Suffix(&'static str),
}

impl PathMatcher {
    fn matches(&self, path: &str) -> bool {
        match self {
            PathMatcher::Exact(expected) => path == *expected,
            PathMatcher::Suffix(suffix) => path.ends_with(suffix),
        }
    }
}

/// One registry entry
pub struct SyntheticEndpoint {
    pub name: &'static str,
    pub method: MethodMatcher,
    pub path: PathMatcher,
    pub generate: Generator,
}

impl SyntheticEndpoint {
    fn new(name: &'static str, method: MethodMatcher, path: PathMatcher, generate: Generator) -> Self {
        Self {
            name,
            method,
            path,
            generate,
        }
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.matches(method) && self.path.matches(path)
    }
}

/// Ordered table of synthesized endpoints
pub struct SyntheticRegistry {
    entries: Vec<SyntheticEndpoint>,
}

impl SyntheticRegistry {
    /// Build the registry for a deployment. The development login entry only
    /// exists when compiled with the `dev-login` feature and the deployment
    /// is marked as development.
    pub fn new(config: &Config) -> Self {
        let get = || MethodMatcher::Only(Method::GET);

        #[allow(unused_mut)]
        let mut entries = vec![
            SyntheticEndpoint::new(
                "source_map",
                MethodMatcher::Any,
                PathMatcher::Suffix(".js.map"),
                source_map_unavailable,
            ),
            SyntheticEndpoint::new("health", get(), PathMatcher::Exact("/health"), health::liveness),
            SyntheticEndpoint::new("debug", get(), PathMatcher::Exact("/debug"), debug::echo),
            SyntheticEndpoint::new("api_test", get(), PathMatcher::Exact("/api/test"), smoke::api_test),
            SyntheticEndpoint::new(
                "test_direct",
                get(),
                PathMatcher::Exact("/test-direct"),
                smoke::direct_test,
            ),
            SyntheticEndpoint::new(
                "auth_helper",
                get(),
                PathMatcher::Exact("/auth-helper"),
                auth::helper_page,
            ),
            SyntheticEndpoint::new(
                "portal_load_script",
                get(),
                PathMatcher::Exact("/api/auth/portalLoad.js"),
                auth::portal_load_script,
            ),
            SyntheticEndpoint::new(
                "search_param_script",
                get(),
                PathMatcher::Exact("/api/auth/searchParam.js"),
                auth::search_param_script,
            ),
        ];

        #[cfg(feature = "dev-login")]
        if config.environment.is_development() {
            tracing::warn!("Development login endpoint enabled at /api/auth/dev-login");
            entries.push(SyntheticEndpoint::new(
                "dev_login",
                MethodMatcher::Only(Method::POST),
                PathMatcher::Exact("/api/auth/dev-login"),
                super::dev_login::dev_login,
            ));
        }

        #[cfg(not(feature = "dev-login"))]
        let _ = config;

        Self { entries }
    }

    /// First entry matching the request, if any
    pub fn find(&self, method: &Method, path: &str) -> Option<&SyntheticEndpoint> {
        self.entries.iter().find(|entry| entry.matches(method, path))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }
}

/// Source maps are never served
fn source_map_unavailable(_: &SyntheticRequest<'_>) -> Response {
    (StatusCode::NOT_FOUND, "Source map not available").into_response()
}
