//! Error types for the edge proxy
//!
//! Every error that reaches a client is rendered as `{message, error, details}`.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("API_ENDPOINT environment variable is not configured")]
    MissingConfiguration,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Request body exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("No response from backend: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to build backend request: {0}")]
    RequestSetup(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingConfiguration => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Transport(_) => StatusCode::BAD_GATEWAY,
            AppError::RequestSetup(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metric label for the error class
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::MissingConfiguration => "configuration",
            AppError::BadRequest(_) => "bad_request",
            AppError::PayloadTooLarge { .. } => "payload_too_large",
            AppError::Transport(e) if e.is_timeout() => "timeout",
            AppError::Transport(_) => "transport",
            AppError::RequestSetup(_) => "setup",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::MissingConfiguration => ErrorResponse {
                message: self.to_string(),
                error: "Configuration error".to_string(),
                details: Some(
                    "Set API_ENDPOINT to the backend API domain or URL and restart the service"
                        .to_string(),
                ),
            },
            AppError::BadRequest(msg) => ErrorResponse {
                message: "Bad request".to_string(),
                error: msg.clone(),
                details: None,
            },
            AppError::PayloadTooLarge { limit } => ErrorResponse {
                message: "Payload too large".to_string(),
                error: self.to_string(),
                details: Some(format!("Raise MAX_BODY_BYTES above {} to accept larger bodies", limit)),
            },
            AppError::Transport(e) => ErrorResponse {
                message: "Proxy error".to_string(),
                error: e.to_string(),
                details: Some(if e.is_timeout() {
                    "Backend did not respond before the timeout".to_string()
                } else if e.is_connect() {
                    "Could not connect to the backend API".to_string()
                } else {
                    "No response received from the backend API".to_string()
                }),
            },
            AppError::RequestSetup(msg) => ErrorResponse {
                message: "Proxy setup error".to_string(),
                error: msg.clone(),
                details: None,
            },
            AppError::Internal(e) => ErrorResponse {
                message: "Internal server error".to_string(),
                error: e.to_string(),
                details: Some(format!("{:?}", e)),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Panic body returned by the outermost boundary
#[derive(Debug, Serialize)]
struct PanicResponse {
    message: String,
    error: String,
    stack: String,
}

thread_local! {
    // Backtrace of the most recent panic on this thread, taken at the panic site
    static PANIC_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Log panics through tracing and keep their backtrace for `handle_panic`.
/// The catch-panic layer unwinds on the panicking thread, so the hook's
/// capture is the one the handler reads back.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let backtrace = Backtrace::force_capture().to_string();
        tracing::error!(panic = %panic_info, "Unhandled panic");
        PANIC_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(backtrace));
    }));
}

/// Convert a handler panic into a 500 response
///
/// Used with `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic payload".to_string()
    };

    tracing::error!(error = %detail, "Request handler panicked");

    let body = PanicResponse {
        message: "Internal server error".to_string(),
        error: detail,
        stack: PANIC_BACKTRACE
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or_else(|| "backtrace not captured".to_string()),
    };

    let json = serde_json::to_vec(&body).unwrap_or_default();
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
