//! Task status value object
//!
//! Represents the kanban state of a task. `Overdue` is a computed state:
//! the service derives it from the due date and only the service may
//! persist it, never a client.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Task status indicating its current lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    /// Task is a draft, not yet actionable
    Draft,
    /// Task is open and actionable
    #[default]
    Open,
    /// Task is being worked on
    InProgress,
    /// Task is completed
    Completed,
    /// Task due date elapsed while the task was still active (computed)
    Overdue,
    /// Task is cancelled
    Cancelled,
}

impl TaskStatus {
    /// Check if this status is terminal for the due-date scanner
    ///
    /// Terminal tasks are never claimed and never become overdue.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Get a human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Overdue => "Overdue",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Stable rank used for sorting
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::Open => 1,
            Self::InProgress => 2,
            Self::Overdue => 3,
            Self::Completed => 4,
            Self::Cancelled => 5,
        }
    }

    /// Get all statuses
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::Draft,
            Self::Open,
            Self::InProgress,
            Self::Completed,
            Self::Overdue,
            Self::Cancelled,
        ]
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "open" => Ok(Self::Open),
            "inprogress" | "in_progress" | "in-progress" => Ok(Self::InProgress),
            "completed" | "done" => Ok(Self::Completed),
            "overdue" => Ok(Self::Overdue),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}
