//! Task service - Domain rules on top of the stores
//!
//! Owns the optimistic-concurrency update protocol and the overdue rules:
//! every mutation commits through a version-checked conditional write, and
//! the `Overdue` status is computed here, never accepted from clients.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use domain::entities::{Task, User};
use domain::value_objects::{EmailAddress, Priority, TaskId, TaskStatus, UserId, VersionToken};
use tracing::{debug, info, instrument};

use crate::error::ApplicationError;
use crate::pagination::Page;
use crate::ports::{TaskStorePort, UserStorePort};
use crate::query::TaskQuery;

/// Embedded user reference carried by task create/update requests;
/// resolved against the store with upsert-by-email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInput {
    /// Display name
    pub full_name: String,
    /// Raw email, normalized before use
    pub email: String,
    /// Contact telephone number
    pub telephone: String,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTaskInput {
    /// Short title
    pub title: String,
    /// Detailed description
    pub description: String,
    /// Due date; must be strictly in the future
    pub due_date: DateTime<Utc>,
    /// Priority level
    pub priority: Priority,
    /// Initial status; defaults to `Open`, explicit `Overdue` is rejected
    pub status: Option<TaskStatus>,
    /// Owning user, upserted by email
    pub owner: UserInput,
    /// Assigned user, upserted by email; defaults to the owner
    pub assignee: Option<UserInput>,
}

/// Input for updating a task; absent fields keep their stored value
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskInput {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New due date; must not be strictly in the past, and a currently
    /// overdue task requires one strictly in the future
    pub due_date: Option<DateTime<Utc>>,
    /// New priority
    pub priority: Option<Priority>,
    /// New status; explicit `Overdue` is rejected
    pub status: Option<TaskStatus>,
    /// New assignee; must reference an existing user
    pub assignee_id: Option<UserId>,
}

/// A task with its owner and assignee resolved
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDetails {
    /// The task row
    pub task: Task,
    /// Resolved owner
    pub owner: User,
    /// Resolved assignee, if any
    pub assignee: Option<User>,
}

/// Service implementing the task domain rules
pub struct TaskService {
    tasks: Arc<dyn TaskStorePort>,
    users: Arc<dyn UserStorePort>,
}

impl std::fmt::Debug for TaskService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskService").finish_non_exhaustive()
    }
}

impl TaskService {
    /// Create a new task service
    pub fn new(tasks: Arc<dyn TaskStorePort>, users: Arc<dyn UserStorePort>) -> Self {
        Self { tasks, users }
    }

    /// Create a task, upserting its owner (and assignee) by email
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_task(
        &self,
        input: CreateTaskInput,
    ) -> Result<TaskDetails, ApplicationError> {
        let now = Utc::now();

        if input.due_date <= now {
            return Err(ApplicationError::InvalidOperation(
                "due date must be in the future".to_string(),
            ));
        }
        if input.status == Some(TaskStatus::Overdue) {
            return Err(ApplicationError::InvalidOperation(
                "status Overdue is computed and cannot be set explicitly".to_string(),
            ));
        }

        let owner = self.upsert_user(&input.owner).await?;
        let assignee = match &input.assignee {
            Some(assignee) => self.upsert_user(assignee).await?,
            None => owner.clone(),
        };

        let task = Task::new(
            input.title,
            input.description,
            input.due_date,
            input.priority,
            owner.id,
        )
        .with_status(input.status.unwrap_or_default())
        .with_assignee(assignee.id);

        self.tasks.create(&task).await?;

        info!(task_id = %task.id, owner = %owner.id, "Task created");

        Ok(TaskDetails {
            task,
            owner,
            assignee: Some(assignee),
        })
    }

    /// Get a task with resolved owner/assignee
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn get_task(&self, id: &TaskId) -> Result<Option<TaskDetails>, ApplicationError> {
        match self.tasks.find(id).await? {
            Some(task) => Ok(Some(self.resolve(task).await?)),
            None => Ok(None),
        }
    }

    /// List tasks matching a composed query
    #[instrument(skip(self, query))]
    pub async fn list_tasks(
        &self,
        query: &TaskQuery,
    ) -> Result<Page<TaskDetails>, ApplicationError> {
        let now = Utc::now();
        let page = self.tasks.list(query, now).await?;

        let mut ids: Vec<UserId> = Vec::new();
        for task in &page.items {
            if !ids.contains(&task.owner_id) {
                ids.push(task.owner_id);
            }
            if let Some(assignee) = task.assignee_id
                && !ids.contains(&assignee)
            {
                ids.push(assignee);
            }
        }
        let users: HashMap<UserId, User> = self
            .users
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let mut items = Vec::with_capacity(page.items.len());
        for task in page.items {
            let owner = users
                .get(&task.owner_id)
                .cloned()
                .ok_or_else(|| missing_user(task.owner_id))?;
            let assignee = match task.assignee_id {
                Some(id) => Some(users.get(&id).cloned().ok_or_else(|| missing_user(id))?),
                None => None,
            };
            items.push(TaskDetails {
                task,
                owner,
                assignee,
            });
        }

        Ok(Page {
            items,
            page: page.page,
            page_size: page.page_size,
            total_items: page.total_items,
        })
    }

    /// Update a task's mutable fields under a version check
    #[instrument(skip(self, input), fields(task_id = %id))]
    pub async fn update_task(
        &self,
        id: &TaskId,
        input: UpdateTaskInput,
        expected_version: VersionToken,
    ) -> Result<TaskDetails, ApplicationError> {
        let now = Utc::now();
        let mut task = self
            .tasks
            .find(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Task", id))?;

        if let Some(due) = input.due_date
            && due < now
        {
            return Err(ApplicationError::InvalidOperation(
                "due date must not be in the past".to_string(),
            ));
        }
        if task.is_overdue(now) && !input.due_date.is_some_and(|due| due > now) {
            return Err(ApplicationError::InvalidOperation(
                "cannot update overdue task unless due date moves to future".to_string(),
            ));
        }
        if input.status == Some(TaskStatus::Overdue) {
            return Err(ApplicationError::InvalidOperation(
                "status Overdue is computed and cannot be set explicitly".to_string(),
            ));
        }
        if let Some(assignee) = input.assignee_id
            && task.assignee_id != Some(assignee)
            && !self.users.exists(&assignee).await?
        {
            return Err(ApplicationError::not_found("User", assignee));
        }

        if let Some(title) = input.title {
            task.title = title;
        }
        if let Some(description) = input.description {
            task.description = description;
        }
        if let Some(due_date) = input.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = input.priority {
            task.priority = priority;
        }
        if let Some(status) = input.status {
            task.status = status;
        }
        if let Some(assignee) = input.assignee_id {
            task.assignee_id = Some(assignee);
        }
        recompute_status(&mut task, now);

        task.touch(now);
        self.tasks.update_if_version(&task, &expected_version).await?;

        debug!(task_id = %task.id, version = %task.version, "Task updated");

        self.resolve(task).await
    }

    /// Update only the status, under the same rules as a full update
    #[instrument(skip(self), fields(task_id = %id, status = %status))]
    pub async fn update_task_status(
        &self,
        id: &TaskId,
        status: TaskStatus,
        expected_version: VersionToken,
    ) -> Result<TaskDetails, ApplicationError> {
        self.update_task(
            id,
            UpdateTaskInput {
                status: Some(status),
                ..UpdateTaskInput::default()
            },
            expected_version,
        )
        .await
    }

    /// Set or clear the assignee, under a version check
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn update_task_assignee(
        &self,
        id: &TaskId,
        assignee_id: Option<UserId>,
        expected_version: VersionToken,
    ) -> Result<TaskDetails, ApplicationError> {
        let now = Utc::now();
        let mut task = self
            .tasks
            .find(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Task", id))?;

        if let Some(assignee) = assignee_id
            && task.assignee_id != Some(assignee)
            && !self.users.exists(&assignee).await?
        {
            return Err(ApplicationError::not_found("User", assignee));
        }

        task.assignee_id = assignee_id;
        task.touch(now);
        self.tasks.update_if_version(&task, &expected_version).await?;

        self.resolve(task).await
    }

    /// Delete a task; no version check, delete is absolute
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn delete_task(&self, id: &TaskId) -> Result<(), ApplicationError> {
        self.tasks.delete(id).await?;
        info!(task_id = %id, "Task deleted");
        Ok(())
    }

    async fn upsert_user(&self, input: &UserInput) -> Result<User, ApplicationError> {
        let email = EmailAddress::new(&input.email)?;
        self.users
            .upsert_by_email(&input.full_name, &email, &input.telephone)
            .await
    }

    async fn resolve(&self, task: Task) -> Result<TaskDetails, ApplicationError> {
        let owner = self
            .users
            .find(&task.owner_id)
            .await?
            .ok_or_else(|| missing_user(task.owner_id))?;
        let assignee = match task.assignee_id {
            Some(id) => Some(self.users.find(&id).await?.ok_or_else(|| missing_user(id))?),
            None => None,
        };
        Ok(TaskDetails {
            task,
            owner,
            assignee,
        })
    }

}

/// A task row references a user the store no longer has; the schema's
/// foreign keys make this unreachable short of corruption.
fn missing_user(id: UserId) -> ApplicationError {
    ApplicationError::Internal(format!("task references missing user {id}"))
}

/// Rewrite the stored status from the due date: an overdue result is
/// persisted as `Overdue`, and a task leaving overdue that still carries
/// the computed status falls back to `Open`.
fn recompute_status(task: &mut Task, now: DateTime<Utc>) {
    if task.is_overdue(now) {
        task.status = TaskStatus::Overdue;
    } else if task.status == TaskStatus::Overdue {
        task.status = TaskStatus::Open;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use mockall::predicate::eq;

    use super::*;
    use crate::ports::{MockTaskStorePort, MockUserStorePort};

    fn sample_user(email: &str) -> User {
        User::new("A", EmailAddress::new(email).unwrap(), "+972501234567")
    }

    fn sample_input(due_in: Duration) -> CreateTaskInput {
        CreateTaskInput {
            title: "T1".to_string(),
            description: "first".to_string(),
            due_date: Utc::now() + due_in,
            priority: Priority::Medium,
            status: None,
            owner: UserInput {
                full_name: "A".to_string(),
                email: "a@x.io".to_string(),
                telephone: "+972501234567".to_string(),
            },
            assignee: None,
        }
    }

    fn stored_task(owner: &User, due_in: Duration) -> Task {
        Task::new(
            "T1",
            "first",
            Utc::now() + due_in,
            Priority::Medium,
            owner.id,
        )
    }

    fn service(tasks: MockTaskStorePort, users: MockUserStorePort) -> TaskService {
        TaskService::new(Arc::new(tasks), Arc::new(users))
    }

    #[tokio::test]
    async fn create_rejects_past_due_date() {
        let svc = service(MockTaskStorePort::new(), MockUserStorePort::new());

        let result = svc.create_task(sample_input(Duration::days(-1))).await;

        assert!(matches!(
            result,
            Err(ApplicationError::InvalidOperation(msg)) if msg.contains("future")
        ));
    }

    #[tokio::test]
    async fn create_rejects_explicit_overdue_status() {
        let svc = service(MockTaskStorePort::new(), MockUserStorePort::new());

        let mut input = sample_input(Duration::days(1));
        input.status = Some(TaskStatus::Overdue);

        let result = svc.create_task(input).await;
        assert!(matches!(result, Err(ApplicationError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn create_defaults_assignee_to_owner() {
        let owner = sample_user("a@x.io");
        let owner_clone = owner.clone();

        let mut users = MockUserStorePort::new();
        users
            .expect_upsert_by_email()
            .times(1)
            .returning(move |_, _, _| Ok(owner_clone.clone()));

        let mut tasks = MockTaskStorePort::new();
        tasks.expect_create().times(1).returning(|_| Ok(()));

        let svc = service(tasks, users);
        let details = svc.create_task(sample_input(Duration::days(1))).await.unwrap();

        assert_eq!(details.task.status, TaskStatus::Open);
        assert_eq!(details.task.owner_id, owner.id);
        assert_eq!(details.task.assignee_id, Some(owner.id));
        assert_eq!(details.assignee.as_ref().map(|u| u.id), Some(owner.id));
        assert!(details.task.due_notified_at.is_none());
    }

    #[tokio::test]
    async fn create_upserts_distinct_assignee() {
        let owner = sample_user("a@x.io");
        let assignee = sample_user("b@x.io");
        let owner_clone = owner.clone();
        let assignee_clone = assignee.clone();

        let mut users = MockUserStorePort::new();
        users
            .expect_upsert_by_email()
            .times(2)
            .returning(move |_, email, _| {
                if email.as_str() == "a@x.io" {
                    Ok(owner_clone.clone())
                } else {
                    Ok(assignee_clone.clone())
                }
            });

        let mut tasks = MockTaskStorePort::new();
        tasks.expect_create().times(1).returning(|_| Ok(()));

        let svc = service(tasks, users);
        let mut input = sample_input(Duration::days(1));
        input.assignee = Some(UserInput {
            full_name: "B".to_string(),
            email: "b@x.io".to_string(),
            telephone: "+15550001111".to_string(),
        });

        let details = svc.create_task(input).await.unwrap();
        assert_eq!(details.task.assignee_id, Some(assignee.id));
    }

    #[tokio::test]
    async fn update_missing_task_is_not_found() {
        let mut tasks = MockTaskStorePort::new();
        tasks.expect_find().returning(|_| Ok(None));

        let svc = service(tasks, MockUserStorePort::new());
        let result = svc
            .update_task(
                &TaskId::new(),
                UpdateTaskInput::default(),
                VersionToken::fresh(),
            )
            .await;

        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_rejects_past_due_date() {
        let owner = sample_user("a@x.io");
        let stored = stored_task(&owner, Duration::hours(1));

        let mut tasks = MockTaskStorePort::new();
        let found = stored.clone();
        tasks.expect_find().returning(move |_| Ok(Some(found.clone())));

        let svc = service(tasks, MockUserStorePort::new());
        let input = UpdateTaskInput {
            due_date: Some(Utc::now() - Duration::minutes(10)),
            ..UpdateTaskInput::default()
        };

        let result = svc.update_task(&stored.id, input, stored.version).await;
        assert!(matches!(
            result,
            Err(ApplicationError::InvalidOperation(msg)) if msg.contains("past")
        ));
    }

    #[tokio::test]
    async fn overdue_task_requires_future_due_date() {
        let owner = sample_user("a@x.io");
        let stored = stored_task(&owner, Duration::hours(-1));

        let mut tasks = MockTaskStorePort::new();
        let found = stored.clone();
        tasks.expect_find().returning(move |_| Ok(Some(found.clone())));

        let svc = service(tasks, MockUserStorePort::new());

        // No due date move at all
        let result = svc
            .update_task(&stored.id, UpdateTaskInput::default(), stored.version)
            .await;
        assert!(matches!(
            result,
            Err(ApplicationError::InvalidOperation(msg)) if msg.contains("overdue")
        ));
    }

    #[tokio::test]
    async fn overdue_task_moving_due_date_future_recomputes_open() {
        let owner = sample_user("a@x.io");
        let stored = stored_task(&owner, Duration::hours(-1));
        let expected_version = stored.version;

        let mut tasks = MockTaskStorePort::new();
        let found = stored.clone();
        tasks.expect_find().returning(move |_| Ok(Some(found.clone())));
        tasks
            .expect_update_if_version()
            .withf(move |task, expected| {
                task.status == TaskStatus::Open && *expected == expected_version
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut users = MockUserStorePort::new();
        let owner_clone = owner.clone();
        users
            .expect_find()
            .returning(move |_| Ok(Some(owner_clone.clone())));

        let svc = service(tasks, users);
        let input = UpdateTaskInput {
            due_date: Some(Utc::now() + Duration::hours(1)),
            ..UpdateTaskInput::default()
        };

        let details = svc
            .update_task(&stored.id, input, expected_version)
            .await
            .unwrap();

        assert_eq!(details.task.status, TaskStatus::Open);
        assert_ne!(details.task.version, expected_version);
    }

    #[tokio::test]
    async fn stored_overdue_status_reverts_to_open_on_rescue() {
        let owner = sample_user("a@x.io");
        let stored = stored_task(&owner, Duration::hours(-1)).with_status(TaskStatus::Overdue);
        let expected_version = stored.version;

        let mut tasks = MockTaskStorePort::new();
        let found = stored.clone();
        tasks.expect_find().returning(move |_| Ok(Some(found.clone())));
        tasks
            .expect_update_if_version()
            .withf(|task, _| task.status == TaskStatus::Open)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut users = MockUserStorePort::new();
        let owner_clone = owner.clone();
        users
            .expect_find()
            .returning(move |_| Ok(Some(owner_clone.clone())));

        let svc = service(tasks, users);
        let input = UpdateTaskInput {
            due_date: Some(Utc::now() + Duration::hours(2)),
            ..UpdateTaskInput::default()
        };

        let details = svc
            .update_task(&stored.id, input, expected_version)
            .await
            .unwrap();
        assert_eq!(details.task.status, TaskStatus::Open);
    }

    #[tokio::test]
    async fn update_rejects_explicit_overdue_status() {
        let owner = sample_user("a@x.io");
        let stored = stored_task(&owner, Duration::hours(1));

        let mut tasks = MockTaskStorePort::new();
        let found = stored.clone();
        tasks.expect_find().returning(move |_| Ok(Some(found.clone())));

        let svc = service(tasks, MockUserStorePort::new());
        let input = UpdateTaskInput {
            status: Some(TaskStatus::Overdue),
            ..UpdateTaskInput::default()
        };

        let result = svc.update_task(&stored.id, input, stored.version).await;
        assert!(matches!(result, Err(ApplicationError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn update_surfaces_concurrency_conflict() {
        let owner = sample_user("a@x.io");
        let stored = stored_task(&owner, Duration::hours(1));

        let mut tasks = MockTaskStorePort::new();
        let found = stored.clone();
        tasks.expect_find().returning(move |_| Ok(Some(found.clone())));
        tasks.expect_update_if_version().returning(|_, _| {
            Err(ApplicationError::ConcurrencyConflict(
                "task was modified concurrently".to_string(),
            ))
        });

        let svc = service(tasks, MockUserStorePort::new());
        let input = UpdateTaskInput {
            title: Some("renamed".to_string()),
            ..UpdateTaskInput::default()
        };

        let result = svc.update_task(&stored.id, input, VersionToken::fresh()).await;
        assert!(matches!(
            result,
            Err(ApplicationError::ConcurrencyConflict(_))
        ));
    }

    #[tokio::test]
    async fn update_rejects_unknown_assignee() {
        let owner = sample_user("a@x.io");
        let stored = stored_task(&owner, Duration::hours(1));
        let unknown = UserId::new();

        let mut tasks = MockTaskStorePort::new();
        let found = stored.clone();
        tasks.expect_find().returning(move |_| Ok(Some(found.clone())));

        let mut users = MockUserStorePort::new();
        users
            .expect_exists()
            .with(eq(unknown))
            .returning(|_| Ok(false));

        let svc = service(tasks, users);
        let input = UpdateTaskInput {
            assignee_id: Some(unknown),
            ..UpdateTaskInput::default()
        };

        let result = svc.update_task(&stored.id, input, stored.version).await;
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_applies_a_known_assignee() {
        let owner = sample_user("a@x.io");
        let assignee = sample_user("b@x.io");
        let stored = stored_task(&owner, Duration::hours(1));
        let assignee_id = assignee.id;

        let mut tasks = MockTaskStorePort::new();
        let found = stored.clone();
        tasks.expect_find().returning(move |_| Ok(Some(found.clone())));
        tasks
            .expect_update_if_version()
            .withf(move |task, _| task.assignee_id == Some(assignee_id))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut users = MockUserStorePort::new();
        users
            .expect_exists()
            .with(eq(assignee_id))
            .returning(|_| Ok(true));
        let owner_clone = owner.clone();
        let assignee_clone = assignee.clone();
        users.expect_find().returning(move |id| {
            if *id == assignee_id {
                Ok(Some(assignee_clone.clone()))
            } else {
                Ok(Some(owner_clone.clone()))
            }
        });

        let svc = service(tasks, users);
        let input = UpdateTaskInput {
            assignee_id: Some(assignee_id),
            ..UpdateTaskInput::default()
        };

        let details = svc
            .update_task(&stored.id, input, stored.version)
            .await
            .unwrap();
        assert_eq!(details.task.assignee_id, Some(assignee_id));
        assert_eq!(details.assignee.map(|u| u.id), Some(assignee_id));
    }

    #[tokio::test]
    async fn status_update_on_overdue_task_is_rejected() {
        let owner = sample_user("a@x.io");
        let stored = stored_task(&owner, Duration::hours(-1));

        let mut tasks = MockTaskStorePort::new();
        let found = stored.clone();
        tasks.expect_find().returning(move |_| Ok(Some(found.clone())));

        let svc = service(tasks, MockUserStorePort::new());
        let result = svc
            .update_task_status(&stored.id, TaskStatus::Completed, stored.version)
            .await;

        assert!(matches!(result, Err(ApplicationError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn status_update_rewrites_version() {
        let owner = sample_user("a@x.io");
        let stored = stored_task(&owner, Duration::hours(1));
        let expected_version = stored.version;

        let mut tasks = MockTaskStorePort::new();
        let found = stored.clone();
        tasks.expect_find().returning(move |_| Ok(Some(found.clone())));
        tasks
            .expect_update_if_version()
            .withf(|task, _| task.status == TaskStatus::InProgress)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut users = MockUserStorePort::new();
        let owner_clone = owner.clone();
        users
            .expect_find()
            .returning(move |_| Ok(Some(owner_clone.clone())));

        let svc = service(tasks, users);
        let details = svc
            .update_task_status(&stored.id, TaskStatus::InProgress, expected_version)
            .await
            .unwrap();

        assert_eq!(details.task.status, TaskStatus::InProgress);
        assert_ne!(details.task.version, expected_version);
    }

    #[tokio::test]
    async fn assignee_update_clears_assignee() {
        let owner = sample_user("a@x.io");
        let mut stored = stored_task(&owner, Duration::hours(1));
        stored.assignee_id = Some(UserId::new());

        let mut tasks = MockTaskStorePort::new();
        let found = stored.clone();
        tasks.expect_find().returning(move |_| Ok(Some(found.clone())));
        tasks
            .expect_update_if_version()
            .withf(|task, _| task.assignee_id.is_none())
            .times(1)
            .returning(|_, _| Ok(()));

        let mut users = MockUserStorePort::new();
        let owner_clone = owner.clone();
        users
            .expect_find()
            .returning(move |_| Ok(Some(owner_clone.clone())));

        let svc = service(tasks, users);
        let details = svc
            .update_task_assignee(&stored.id, None, stored.version)
            .await
            .unwrap();

        assert!(details.task.assignee_id.is_none());
        assert!(details.assignee.is_none());
    }

    #[tokio::test]
    async fn delete_passes_through_not_found() {
        let mut tasks = MockTaskStorePort::new();
        tasks
            .expect_delete()
            .returning(|id| Err(ApplicationError::not_found("Task", id)));

        let svc = service(tasks, MockUserStorePort::new());
        let result = svc.delete_task(&TaskId::new()).await;
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }
}
