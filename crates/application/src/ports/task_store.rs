//! Task storage port
//!
//! The sole writer to the task table. Enforces version-token concurrency
//! on updates and owns the atomic claim statement used by the due-date
//! scanner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::entities::Task;
use domain::value_objects::{TaskId, VersionToken};
#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use crate::error::ApplicationError;
use crate::pagination::Page;
use crate::query::TaskQuery;

/// Projection of a row claimed by the scanner, enough to build the due
/// notification without re-reading the full task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedTask {
    /// Claimed task id
    pub id: TaskId,
    /// Title at claim time
    pub title: String,
    /// The elapsed due date
    pub due_date: DateTime<Utc>,
}

/// Port for task persistence operations
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait TaskStorePort: Send + Sync {
    /// Find a task by id
    async fn find(&self, id: &TaskId) -> Result<Option<Task>, ApplicationError>;

    /// List tasks matching a composed query, with the unpaged total.
    ///
    /// `now` anchors the `OverdueOnly` predicate so results are
    /// deterministic for a fixed instant. Sort ties are broken by id.
    async fn list(
        &self,
        query: &TaskQuery,
        now: DateTime<Utc>,
    ) -> Result<Page<Task>, ApplicationError>;

    /// Insert a new task; the caller has already assigned a fresh version
    async fn create(&self, task: &Task) -> Result<(), ApplicationError>;

    /// Commit the given task state only if the stored version still equals
    /// `expected` - a single atomic conditional write with no
    /// read-then-write window.
    ///
    /// Returns `ConcurrencyConflict` on version mismatch (no retries) and
    /// `NotFound` if the row is gone.
    async fn update_if_version(
        &self,
        task: &Task,
        expected: &VersionToken,
    ) -> Result<(), ApplicationError>;

    /// Delete a task without a version check (delete is absolute)
    async fn delete(&self, id: &TaskId) -> Result<(), ApplicationError>;

    /// Atomically claim up to `batch_size` due tasks by stamping
    /// `due_notified_at = now`, oldest due date first. Only rows with
    /// `due_date < now`, no claim marker, and a non-terminal status are
    /// eligible; the eligibility check and the stamp execute as one
    /// statement, so concurrent scanners never claim the same row.
    ///
    /// Returns the number of rows claimed; `0` when nothing was eligible.
    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        batch_size: u32,
    ) -> Result<u64, ApplicationError>;

    /// Fetch the rows whose claim marker equals exactly `now`, i.e. the
    /// rows just claimed by this tick
    async fn select_claimed_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ClaimedTask>, ApplicationError>;
}
