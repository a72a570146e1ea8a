//! Client-side glue for callers of the task API
//!
//! Two collaborator contracts: [`ApiReadyGate`] blocks until the API's
//! `/health` endpoint answers, and [`RequestDeduper`] collapses identical
//! concurrent idempotent requests into one in-flight call.

pub mod dedup;
pub mod ready;

pub use dedup::{DedupError, RequestDeduper, SharedResponse};
pub use ready::{ApiReadyGate, ReadinessError};
