//! Port definitions for the application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these
//! ports.

mod event_publisher;
mod task_store;
mod user_store;

pub use event_publisher::TaskEventPublisher;
#[cfg(any(test, feature = "testing"))]
pub use event_publisher::MockTaskEventPublisher;
pub use task_store::{ClaimedTask, TaskStorePort};
#[cfg(any(test, feature = "testing"))]
pub use task_store::MockTaskStorePort;
pub use user_store::UserStorePort;
#[cfg(any(test, feature = "testing"))]
pub use user_store::MockUserStorePort;
