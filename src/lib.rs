//! Sandbox edge - proxy service and deployment planner for the sandbox
//! account platform
//!
//! The library holds the proxy service (request pipeline, header policy,
//! synthesized endpoints, static frontend) and the deployment planner
//! (topology selection and periodic job triggers).

pub mod config;
pub mod deploy;
pub mod edge;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod proxy;
pub mod routes;

use std::time::Duration;

use anyhow::Result;

pub use crate::config::Config;
pub use crate::proxy::{BackendClient, BackendOrigin};
pub use crate::routes::{spa::StaticSite, synthesized::SyntheticRegistry};

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    /// Client for the backend API origin
    pub backend: BackendClient,
    /// Endpoints answered without the backend
    pub registry: SyntheticRegistry,
    /// Built frontend
    pub static_site: StaticSite,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        let backend = BackendClient::new(
            config.backend.clone(),
            Duration::from_secs(config.upstream_timeout_seconds),
        )?;
        let registry = SyntheticRegistry::new(&config);
        let static_site = StaticSite::new(config.static_dir.clone());

        Ok(Self {
            config,
            backend,
            registry,
            static_site,
        })
    }
}
