//! Deployment context
//!
//! Deployment-time settings passed as `key=value` pairs. The architecture
//! flag is resolved here once and then handed to the factories as a value.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Context key selecting the load balancer + container topology
pub const ARCHITECTURE_CONTEXT_KEY: &str = "useAlbArchitecture";

/// Environment variable consulted when the context has no value
pub const ARCHITECTURE_ENV_VAR: &str = "USE_ALB_ARCHITECTURE";

#[derive(Debug, Error, PartialEq)]
pub enum ContextError {
    #[error("context entry '{0}' must have the form key=value")]
    MalformedEntry(String),

    #[error("{source_name} value '{value}' is not a boolean (use true or false)")]
    InvalidFlag { source_name: String, value: String },
}

/// Where the architecture flag came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagSource {
    Context,
    Environment,
    Default,
}

/// Resolved architecture switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArchitectureFlag {
    pub use_alb: bool,
    pub source: FlagSource,
}

/// Explicit deployment context
#[derive(Debug, Clone, Default)]
pub struct DeploymentContext {
    values: BTreeMap<String, String>,
}

impl DeploymentContext {
    /// Parse `key=value` entries; later entries win
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, ContextError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = BTreeMap::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .filter(|(k, _)| !k.trim().is_empty())
                .ok_or_else(|| ContextError::MalformedEntry(pair.to_string()))?;
            values.insert(key.trim().to_string(), value.trim().to_string());
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Resolve the architecture flag: context, then environment, then `false`
    pub fn resolve_architecture<F>(&self, env: F) -> Result<ArchitectureFlag, ContextError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = self.get(ARCHITECTURE_CONTEXT_KEY) {
            return Ok(ArchitectureFlag {
                use_alb: parse_flag(ARCHITECTURE_CONTEXT_KEY, value)?,
                source: FlagSource::Context,
            });
        }

        if let Some(value) = env(ARCHITECTURE_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            return Ok(ArchitectureFlag {
                use_alb: parse_flag(ARCHITECTURE_ENV_VAR, &value)?,
                source: FlagSource::Environment,
            });
        }

        Ok(ArchitectureFlag {
            use_alb: false,
            source: FlagSource::Default,
        })
    }
}

fn parse_flag(source_name: &str, value: &str) -> Result<bool, ContextError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ContextError::InvalidFlag {
            source_name: source_name.to_string(),
            value: value.to_string(),
        }),
    }
}
