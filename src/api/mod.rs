//! HTTP surface: router, middleware, endpoint handlers, and the error type
//! that maps layer errors onto structured JSON responses.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use types::ApiContext;
