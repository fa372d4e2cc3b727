//! Mock infrastructure for testing external services
//!
//! - Backend API (the serverless origin behind `/api/*`)

pub mod backend;

pub use backend::*;
