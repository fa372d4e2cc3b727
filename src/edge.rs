//! Edge router dispatch
//!
//! Decides, from the path alone, whether a request is a liveness probe, API
//! traffic, or a frontend asset. Both topologies render these rules into
//! their own edge configuration, and the proxy service applies them at
//! request time.

use serde::Serialize;

/// Path prefix shared by the backend API and the proxy
pub const API_PREFIX: &str = "/api";

/// Liveness path; never depends on backend reachability
pub const HEALTH_PATH: &str = "/health";

/// Single-page-application entry document
pub const SPA_ENTRY: &str = "/index.html";

/// Where the edge sends a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeTarget {
    Liveness,
    Api,
    Asset,
}

/// One path rule as rendered into a deployment plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeRule {
    pub priority: u32,
    pub path_pattern: &'static str,
    pub target: EdgeTarget,
}

/// Path-based dispatch shared by both topologies
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeRouter;

impl EdgeRouter {
    pub fn dispatch(&self, path: &str) -> EdgeTarget {
        if path == HEALTH_PATH {
            EdgeTarget::Liveness
        } else if is_api_path(path) {
            EdgeTarget::Api
        } else {
            EdgeTarget::Asset
        }
    }

    /// Ordered rules; the default asset rule comes last
    pub fn rules(&self) -> Vec<EdgeRule> {
        vec![
            EdgeRule {
                priority: 1,
                path_pattern: HEALTH_PATH,
                target: EdgeTarget::Liveness,
            },
            EdgeRule {
                priority: 2,
                path_pattern: "/api/*",
                target: EdgeTarget::Api,
            },
            EdgeRule {
                priority: 100,
                path_pattern: "*",
                target: EdgeTarget::Asset,
            },
        ]
    }
}

/// True for `/api` and anything below it
pub fn is_api_path(path: &str) -> bool {
    match path.strip_prefix(API_PREFIX) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// True when the last path segment carries a file extension
pub fn has_file_extension(path: &str) -> bool {
    path.rsplit('/').next().is_some_and(|segment| segment.contains('.'))
}
