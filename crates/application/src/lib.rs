//! Application layer - Use cases and orchestration
//!
//! Contains the domain rules on top of the stores (optimistic-concurrency
//! update protocol, overdue gating, upsert-by-email), the claim-and-publish
//! scan tick, and the port definitions infrastructure adapters implement.

pub mod error;
pub mod pagination;
pub mod ports;
pub mod query;
pub mod services;

pub use error::ApplicationError;
pub use pagination::{Page, PageRequest};
pub use ports::*;
pub use query::{SortDirection, TaskPredicate, TaskQuery, TaskSortKey};
pub use services::*;
