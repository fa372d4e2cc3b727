//! Backend origin resolution
//!
//! The backend origin is resolved once at startup and never changes.

use reqwest::Url;
use thiserror::Error;

/// Errors raised while parsing `API_ENDPOINT`
#[derive(Debug, Error, PartialEq)]
pub enum OriginError {
    #[error("backend origin is empty")]
    Empty,

    #[error("backend origin '{0}' is not a valid URL")]
    InvalidUrl(String),

    #[error("backend origin '{0}' has no host")]
    MissingHost(String),
}

/// Network address of the serverless API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOrigin {
    /// `http` or `https`
    pub scheme: String,
    /// Authority component (host, optionally with port)
    pub domain: String,
    /// Deployment stage prefix such as `/prod`
    pub stage_path: Option<String>,
}

impl BackendOrigin {
    /// Parse a bare domain (`abc.execute-api.us-east-1.amazonaws.com`) or a full
    /// URL (`https://abc.execute-api.../prod/`). A bare domain is assumed to be
    /// served over https. `stage_override` replaces any path found in the URL.
    pub fn parse(raw: &str, stage_override: Option<&str>) -> Result<Self, OriginError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(OriginError::Empty);
        }

        let with_scheme = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("https://{}", raw)
        };

        let url = Url::parse(&with_scheme).map_err(|_| OriginError::InvalidUrl(raw.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| OriginError::MissingHost(raw.to_string()))?;
        let domain = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let stage_path = match stage_override {
            Some(stage) => normalize_stage(stage),
            None => normalize_stage(url.path()),
        };

        Ok(Self {
            scheme: url.scheme().to_string(),
            domain,
            stage_path,
        })
    }

    /// Build the full backend URL for a request path that still carries `/api`
    pub fn url_for(&self, path: &str, query: Option<&str>) -> String {
        let mut url = format!(
            "{}://{}{}{}",
            self.scheme,
            self.domain,
            self.stage_path.as_deref().unwrap_or(""),
            path
        );
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(q);
        }
        url
    }
}

/// `"/prod/"` -> `Some("/prod")`, `"/"` or `""` -> `None`
fn normalize_stage(path: &str) -> Option<String> {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{}", trimmed))
    }
}
