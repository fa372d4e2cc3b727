//! Proxy module
//!
//! Handles request capture, header rewriting and forwarding to the backend
//! API origin.

pub mod backend;
pub mod headers;
pub mod origin;
pub mod request;

pub use backend::BackendClient;
pub use headers::HeaderPolicy;
pub use origin::{BackendOrigin, OriginError};
pub use request::{ProxiedRequest, RequestBody};
