//! Task entity - The unit of work tracked by the service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Priority, TaskId, TaskStatus, UserId, VersionToken};

/// A tracked task with optimistic-concurrency and due-date scan state
///
/// Two fields carry the concurrency protocol: `version` changes on every
/// committed write (optimistic updates), and `due_notified_at` is the
/// scanner's claim marker - once set, the row is never claimed again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,
    /// Short title
    pub title: String,
    /// Detailed description
    pub description: String,
    /// When the task is due
    pub due_date: DateTime<Utc>,
    /// Priority level
    pub priority: Priority,
    /// Stored lifecycle status; `Overdue` only ever written by the service
    pub status: TaskStatus,
    /// Owning user (required)
    pub owner_id: UserId,
    /// Assigned user, if any
    pub assignee_id: Option<UserId>,
    /// Reserved client-visible reminder flag; not mutated by the core
    pub reminder_sent: bool,
    /// Claim marker set atomically by the due-date scanner
    pub due_notified_at: Option<DateTime<Utc>>,
    /// When this task was created
    pub created_at: DateTime<Utc>,
    /// When this task was last modified
    pub updated_at: DateTime<Utc>,
    /// Concurrency token, rewritten on every committed modification
    pub version: VersionToken,
}

impl Task {
    /// Create a new open task with a fresh version
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: DateTime<Utc>,
        priority: Priority,
        owner_id: UserId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            title: title.into(),
            description: description.into(),
            due_date,
            priority,
            status: TaskStatus::Open,
            owner_id,
            assignee_id: None,
            reminder_sent: false,
            due_notified_at: None,
            created_at: now,
            updated_at: now,
            version: VersionToken::fresh(),
        }
    }

    /// Set the initial status
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the assignee
    #[must_use]
    pub const fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Check whether the task is overdue at `now`
    ///
    /// Terminal tasks are never overdue regardless of their due date.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date < now && !self.status.is_terminal()
    }

    /// The status as observed by clients: `Overdue` when the due date has
    /// elapsed on a non-terminal task, the stored status otherwise
    #[must_use]
    pub fn effective_status(&self, now: DateTime<Utc>) -> TaskStatus {
        if self.is_overdue(now) {
            TaskStatus::Overdue
        } else {
            self.status
        }
    }

    /// Check whether the scanner may claim this task at `now`
    ///
    /// Claimable means overdue, not yet claimed, and not terminal.
    #[must_use]
    pub fn is_claimable(&self, now: DateTime<Utc>) -> bool {
        self.is_overdue(now) && self.due_notified_at.is_none()
    }

    /// Stamp a committed modification: refresh `updated_at` and the version
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version = VersionToken::fresh();
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} ({})", self.priority, self.title, self.status)
    }
}
