//! Configuration management for the edge proxy
//!
//! Configuration is loaded from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::proxy::BackendOrigin;

/// Deployment environment the process runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentEnvironment {
    Development,
    Production,
}

impl DeploymentEnvironment {
    /// Parse an `ENVIRONMENT` value. Anything unrecognised is production.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Self::Development,
            _ => Self::Production,
        }
    }

    pub fn is_development(self) -> bool {
        self == Self::Development
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// TLS material for the listener
#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Backend API origin. `None` when API_ENDPOINT is unset or empty.
    pub backend: Option<BackendOrigin>,

    /// Root directory of the built frontend
    pub static_dir: PathBuf,

    /// Deployment environment (gates development-only endpoints)
    pub environment: DeploymentEnvironment,

    /// Timeout for calls to the backend origin (in seconds)
    pub upstream_timeout_seconds: u64,
    /// Maximum accepted request body size (in bytes)
    pub max_body_bytes: usize,

    /// Listener certificate. Plain HTTP when absent.
    pub tls: Option<TlsPaths>,

    /// Address for the Prometheus scrape listener
    pub metrics_addr: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let stage_override = env::var("API_STAGE_PATH").ok();
        let backend = match env::var("API_ENDPOINT") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                BackendOrigin::parse(&raw, stage_override.as_deref())
                    .context("Invalid API_ENDPOINT")?,
            ),
            _ => None,
        };

        let tls = match (env::var("TLS_CERT_PATH"), env::var("TLS_KEY_PATH")) {
            (Ok(cert), Ok(key)) if !cert.is_empty() && !key.is_empty() => Some(TlsPaths {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            _ => None,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,

            backend,

            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./public")),

            environment: env::var("ENVIRONMENT")
                .map(|v| DeploymentEnvironment::parse(&v))
                .unwrap_or(DeploymentEnvironment::Production),

            upstream_timeout_seconds: env::var("UPSTREAM_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("Invalid UPSTREAM_TIMEOUT_SECONDS")?,
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .unwrap_or_else(|_| "10485760".to_string())
                .parse()
                .context("Invalid MAX_BODY_BYTES")?,

            tls,

            metrics_addr: env::var("METRICS_ADDR").ok().filter(|v| !v.is_empty()),
        })
    }

    /// Configuration with defaults and the given backend, used by tests and tooling
    pub fn with_backend(backend: Option<BackendOrigin>, static_dir: PathBuf) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            backend,
            static_dir,
            environment: DeploymentEnvironment::Production,
            upstream_timeout_seconds: 30,
            max_body_bytes: 10 * 1024 * 1024,
            tls: None,
            metrics_addr: None,
        }
    }
}
