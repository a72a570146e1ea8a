//! Event publishing port
//!
//! Implemented by the broker adapter. Delivery is at-least-once at best:
//! a failed publish after a successful claim loses that reminder (no
//! outbox), which the adapter logs and the caller tolerates.

use async_trait::async_trait;
use domain::events::TaskDueV1;
#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for publishing task events to the broker
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait TaskEventPublisher: Send + Sync {
    /// Publish a task-due notification
    async fn publish_task_due(&self, event: &TaskDueV1) -> Result<(), ApplicationError>;
}
