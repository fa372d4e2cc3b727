//! Inbound request capture
//!
//! A `ProxiedRequest` is built once per inbound request and consumed by
//! either a synthesized handler or the backend forwarder.

use axum::{
    body::to_bytes,
    extract::Request,
    http::{header, HeaderMap, Method},
};
use bytes::Bytes;
use http_body_util::LengthLimitError;
use serde_json::Value;

use crate::edge::API_PREFIX;
use crate::error::{AppError, AppResult};

/// Request body as received
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// JSON body: parsed for synthesized handlers, forwarded as received
    Json { value: Value, raw: Bytes },
    Raw(Bytes),
}

impl RequestBody {
    /// Bytes to send upstream, exactly as the caller sent them
    pub fn to_bytes(&self) -> Bytes {
        match self {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Json { raw, .. } | RequestBody::Raw(raw) => raw.clone(),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            RequestBody::Json { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// One inbound HTTP request
#[derive(Debug)]
pub struct ProxiedRequest {
    pub method: Method,
    /// Full inbound path, `/api` included
    pub full_path: String,
    /// Path with the API prefix stripped
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: RequestBody,
    /// Value of the inbound `Content-Length` header, if any
    pub content_length: Option<u64>,
}

impl ProxiedRequest {
    /// Capture an axum request, buffering the body up to `limit` bytes
    pub async fn capture(request: Request, limit: usize) -> AppResult<Self> {
        let (parts, body) = request.into_parts();
        let headers = parts.headers;

        let content_length: Option<u64> = headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        if content_length.is_some_and(|declared| declared > limit as u64) {
            return Err(AppError::PayloadTooLarge { limit });
        }

        let bytes = to_bytes(body, limit).await.map_err(|e| {
            let inner = e.into_inner();
            if inner.downcast_ref::<LengthLimitError>().is_some() {
                AppError::PayloadTooLarge { limit }
            } else {
                AppError::BadRequest(format!("Failed to read request body: {}", inner))
            }
        })?;

        let body = parse_body(&headers, bytes)?;

        let full_path = parts.uri.path().to_string();
        let path = strip_api_prefix(&full_path).to_string();

        Ok(Self {
            method: parts.method,
            full_path,
            path,
            query: parts.uri.query().map(str::to_string),
            headers,
            body,
            content_length,
        })
    }

    /// Path as the backend expects it (API prefix restored)
    pub fn backend_path(&self) -> String {
        format!("{}{}", API_PREFIX, self.path)
    }
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let mime = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

fn parse_body(headers: &HeaderMap, bytes: Bytes) -> AppResult<RequestBody> {
    if bytes.is_empty() {
        return Ok(RequestBody::Empty);
    }
    if is_json_content_type(headers) {
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;
        return Ok(RequestBody::Json { value, raw: bytes });
    }
    Ok(RequestBody::Raw(bytes))
}

/// `/api/leases` -> `/leases`, `/api` -> `` (paths outside the prefix are unchanged)
pub fn strip_api_prefix(path: &str) -> &str {
    match path.strip_prefix(API_PREFIX) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}
