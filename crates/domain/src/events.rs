//! Broker event contracts
//!
//! Wire formats published to the event bus. Field names are part of the
//! published contract and must stay stable; the `V1` suffix versions the
//! payload, not the type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::TaskId;

/// Notification that a task's due date has elapsed and the task was claimed
/// by the scanner. Published to exchange `tasks.events` with routing key
/// `task.due`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDueV1 {
    /// Claimed task id; doubles as the broker message id
    pub task_id: TaskId,
    /// Task title at claim time
    pub title: String,
    /// The elapsed due date
    pub due_date_utc: DateTime<Utc>,
    /// The scan tick instant that claimed the task
    pub timestamp_utc: DateTime<Utc>,
}
