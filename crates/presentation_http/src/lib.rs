//! HTTP presentation layer
//!
//! Thin axum surface over the task and user services: request/response
//! DTOs, conditional-request (`If-Match`) plumbing for the version token,
//! error-to-status mapping, and the correlation-id middleware.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorCode};
pub use middleware::{CORRELATION_ID_HEADER, CorrelationId, propagate_correlation_id};
pub use state::AppState;
