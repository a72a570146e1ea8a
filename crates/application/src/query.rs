//! List-query model for tasks
//!
//! Filters are composed from a closed set of predicate variants; the store
//! adapter translates the composed set into its own query language. Keeping
//! the variants closed lets the adapter stay exhaustive and the service
//! stay store-agnostic.

use domain::value_objects::{Priority, TaskStatus, UserId};

use crate::pagination::PageRequest;

/// One filter predicate over the task table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskPredicate {
    /// No scope restriction
    ScopeAll,
    /// Tasks owned by the given user
    ScopeOwner(UserId),
    /// Tasks assigned to the given user
    ScopeAssignee(UserId),
    /// Stored status is one of the given set
    StatusIn(Vec<TaskStatus>),
    /// Priority is one of the given set
    PriorityIn(Vec<Priority>),
    /// Due date elapsed and status is not terminal, evaluated at the
    /// query's `now`
    OverdueOnly,
    /// The reserved reminder flag has the given value
    ReminderSent(bool),
    /// Case-insensitive substring match on title or description
    TitleDescMatches(String),
}

/// Sort key for task listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSortKey {
    /// Sort by due date (the default)
    #[default]
    DueDate,
    /// Sort by creation time
    CreatedAt,
    /// Sort by priority rank
    Priority,
    /// Sort by status rank
    Status,
    /// Sort by title
    Title,
}

impl std::str::FromStr for TaskSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "duedate" | "due_date" => Ok(Self::DueDate),
            "createdat" | "created_at" => Ok(Self::CreatedAt),
            "priority" => Ok(Self::Priority),
            "status" => Ok(Self::Status),
            "title" => Ok(Self::Title),
            _ => Err(format!("Invalid sort key: {s}")),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending (the default)
    #[default]
    Asc,
    /// Descending
    Desc,
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(format!("Invalid sort direction: {s}")),
        }
    }
}

/// A composed task listing query: predicates, sort, and page
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskQuery {
    /// Composed filter predicates, applied conjunctively
    pub predicates: Vec<TaskPredicate>,
    /// Sort key
    pub sort_key: TaskSortKey,
    /// Sort direction
    pub sort_direction: SortDirection,
    /// Page to fetch
    pub page: PageRequest,
}

impl TaskQuery {
    /// Create an unfiltered query with default sort and paging
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to tasks owned by a user
    #[must_use]
    pub fn owned_by(mut self, owner: UserId) -> Self {
        self.predicates.push(TaskPredicate::ScopeOwner(owner));
        self
    }

    /// Restrict to tasks assigned to a user
    #[must_use]
    pub fn assigned_to(mut self, assignee: UserId) -> Self {
        self.predicates.push(TaskPredicate::ScopeAssignee(assignee));
        self
    }

    /// Restrict to a set of stored statuses
    #[must_use]
    pub fn with_status_in(mut self, statuses: Vec<TaskStatus>) -> Self {
        if !statuses.is_empty() {
            self.predicates.push(TaskPredicate::StatusIn(statuses));
        }
        self
    }

    /// Restrict to a set of priorities
    #[must_use]
    pub fn with_priority_in(mut self, priorities: Vec<Priority>) -> Self {
        if !priorities.is_empty() {
            self.predicates.push(TaskPredicate::PriorityIn(priorities));
        }
        self
    }

    /// Restrict to tasks overdue at query time
    #[must_use]
    pub fn overdue_only(mut self) -> Self {
        self.predicates.push(TaskPredicate::OverdueOnly);
        self
    }

    /// Restrict by the reserved reminder flag
    #[must_use]
    pub fn with_reminder_sent(mut self, sent: bool) -> Self {
        self.predicates.push(TaskPredicate::ReminderSent(sent));
        self
    }

    /// Restrict to tasks whose title or description contains the term
    #[must_use]
    pub fn matching(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        if !term.trim().is_empty() {
            self.predicates.push(TaskPredicate::TitleDescMatches(term));
        }
        self
    }

    /// Set the sort key and direction
    #[must_use]
    pub const fn sorted_by(mut self, key: TaskSortKey, direction: SortDirection) -> Self {
        self.sort_key = key;
        self.sort_direction = direction;
        self
    }

    /// Set the page to fetch
    #[must_use]
    pub const fn paged(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }
}
