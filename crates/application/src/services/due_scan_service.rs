//! Due-scan tick - claim due tasks and publish notifications
//!
//! One tick of the scanner: atomically claim a batch of due tasks, then
//! emit one broker message per claimed row. The claim commits before any
//! publish, so a publish failure loses that reminder rather than causing a
//! reclaim; the loss is logged and accepted (no outbox).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domain::events::TaskDueV1;
use tracing::{debug, info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::{TaskEventPublisher, TaskStorePort};

/// Result of one scan tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanOutcome {
    /// Rows whose claim marker was stamped by this tick
    pub claimed: u64,
    /// Notifications successfully handed to the broker
    pub published: u64,
}

/// Service executing the claim-and-publish tick
pub struct DueScanService {
    tasks: Arc<dyn TaskStorePort>,
    publisher: Arc<dyn TaskEventPublisher>,
}

impl std::fmt::Debug for DueScanService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DueScanService").finish_non_exhaustive()
    }
}

impl DueScanService {
    /// Create a new due-scan service
    pub fn new(tasks: Arc<dyn TaskStorePort>, publisher: Arc<dyn TaskEventPublisher>) -> Self {
        Self { tasks, publisher }
    }

    /// Run one tick at `now`, claiming at most `batch_size` tasks
    ///
    /// Multiple concurrent instances stay correct: the claim is one
    /// conditional statement, so a row claimed by another instance is not
    /// claimed again here.
    #[instrument(skip(self))]
    pub async fn run_tick(
        &self,
        now: DateTime<Utc>,
        batch_size: u32,
    ) -> Result<ScanOutcome, ApplicationError> {
        let claimed = self.tasks.claim_due(now, batch_size).await?;
        if claimed == 0 {
            debug!("No due tasks to claim");
            return Ok(ScanOutcome::default());
        }

        info!(claimed, "Claimed due tasks");

        let rows = self.tasks.select_claimed_at(now).await?;
        let mut published = 0u64;
        for row in rows {
            let event = TaskDueV1 {
                task_id: row.id,
                title: row.title,
                due_date_utc: row.due_date,
                timestamp_utc: now,
            };
            match self.publisher.publish_task_due(&event).await {
                Ok(()) => published += 1,
                Err(e) => {
                    // The task stays claimed; this reminder is lost.
                    warn!(task_id = %event.task_id, error = %e, "Failed to publish due notification");
                }
            }
        }

        Ok(ScanOutcome { claimed, published })
    }
}
