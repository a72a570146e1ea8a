//! HTTP middleware

mod correlation_id;

pub use correlation_id::{CORRELATION_ID_HEADER, CorrelationId, propagate_correlation_id};
