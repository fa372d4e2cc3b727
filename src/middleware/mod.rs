//! Middleware module
//!
//! Contains Tower middleware applied to every response.

pub mod security_headers;
