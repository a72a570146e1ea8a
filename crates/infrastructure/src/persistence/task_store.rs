//! SQLite-based task persistence
//!
//! Sole writer to the tasks table. The two protocol-critical statements
//! are single conditional writes: `update_if_version` commits only when
//! the stored version still matches, and `claim_due` stamps the claim
//! marker inside the same statement that checks eligibility, so parallel
//! scanners can never claim the same row twice.

use std::sync::Arc;

use application::{
    ApplicationError, Page, TaskPredicate, TaskQuery, TaskSortKey, SortDirection,
    ports::{ClaimedTask, TaskStorePort},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::entities::Task;
use domain::value_objects::{Priority, TaskId, TaskStatus, UserId, VersionToken};
use rusqlite::{OptionalExtension, Row, params, params_from_iter};
use tokio::task;
use tracing::{debug, instrument};

use super::connection::ConnectionPool;
use super::{fmt_instant, map_pool_err, map_sqlite_err, parse_instant};

const TASK_COLUMNS: &str = "id, title, description, due_date, priority, status, owner_id, \
     assignee_id, reminder_sent, due_notified_at, created_at, updated_at, version";

/// SQLite-based task store
#[derive(Debug, Clone)]
pub struct SqliteTaskStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteTaskStore {
    /// Create a new SQLite task store
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStorePort for SqliteTaskStore {
    #[instrument(skip(self), fields(task_id = %id))]
    async fn find(&self, id: &TaskId) -> Result<Option<Task>, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let id_str = id.to_string();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| map_pool_err(&e))?;

            conn.query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                [&id_str],
                row_to_task,
            )
            .optional()
            .map_err(|e| map_sqlite_err(&e))?
            .transpose()
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self, query))]
    async fn list(
        &self,
        query: &TaskQuery,
        now: DateTime<Utc>,
    ) -> Result<Page<Task>, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let query = query.clone();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| map_pool_err(&e))?;

            let (where_clause, param_values) = build_where(&query.predicates, now);

            let total: u64 = conn
                .query_row(
                    &format!("SELECT COUNT(*) FROM tasks{where_clause}"),
                    params_from_iter(param_values.iter()),
                    |row| row.get(0),
                )
                .map_err(|e| map_sqlite_err(&e))?;

            let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks{where_clause}");
            sql.push_str(&order_by(query.sort_key, query.sort_direction));

            let mut param_values = param_values;
            param_values.push(query.page.limit().to_string());
            sql.push_str(&format!(" LIMIT ?{}", param_values.len()));
            param_values.push(query.page.offset().to_string());
            sql.push_str(&format!(" OFFSET ?{}", param_values.len()));

            let mut stmt = conn.prepare(&sql).map_err(|e| map_sqlite_err(&e))?;
            let rows = stmt
                .query_map(params_from_iter(param_values.iter()), row_to_task)
                .map_err(|e| map_sqlite_err(&e))?;

            let mut items = Vec::new();
            for row in rows {
                items.push(row.map_err(|e| map_sqlite_err(&e))??);
            }

            Ok(Page::new(items, query.page, total))
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self, task), fields(task_id = %task.id))]
    async fn create(&self, task: &Task) -> Result<(), ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let task = task.clone();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| map_pool_err(&e))?;

            conn.execute(
                "INSERT INTO tasks (
                    id, title, description, due_date, priority, status,
                    owner_id, assignee_id, reminder_sent, due_notified_at,
                    created_at, updated_at, version
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    task.id.to_string(),
                    task.title,
                    task.description,
                    fmt_instant(task.due_date),
                    priority_to_str(task.priority),
                    status_to_str(task.status),
                    task.owner_id.to_string(),
                    task.assignee_id.map(|id| id.to_string()),
                    task.reminder_sent,
                    task.due_notified_at.map(fmt_instant),
                    fmt_instant(task.created_at),
                    fmt_instant(task.updated_at),
                    task.version.to_string(),
                ],
            )
            .map_err(|e| map_sqlite_err(&e))?;

            debug!("Task inserted");
            Ok(())
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self, task, expected), fields(task_id = %task.id))]
    async fn update_if_version(
        &self,
        task: &Task,
        expected: &VersionToken,
    ) -> Result<(), ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let task = task.clone();
        let expected = *expected;

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| map_pool_err(&e))?;

            // One conditional statement; the version check and the write
            // are not separable, so there is no read-then-write window.
            let affected = conn
                .execute(
                    "UPDATE tasks SET
                        title = ?1, description = ?2, due_date = ?3,
                        priority = ?4, status = ?5, assignee_id = ?6,
                        reminder_sent = ?7, due_notified_at = ?8,
                        updated_at = ?9, version = ?10
                     WHERE id = ?11 AND version = ?12",
                    params![
                        task.title,
                        task.description,
                        fmt_instant(task.due_date),
                        priority_to_str(task.priority),
                        status_to_str(task.status),
                        task.assignee_id.map(|id| id.to_string()),
                        task.reminder_sent,
                        task.due_notified_at.map(fmt_instant),
                        fmt_instant(task.updated_at),
                        task.version.to_string(),
                        task.id.to_string(),
                        expected.to_string(),
                    ],
                )
                .map_err(|e| map_sqlite_err(&e))?;

            if affected == 1 {
                debug!("Task updated");
                return Ok(());
            }

            let exists: bool = conn
                .query_row(
                    "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?1)",
                    [task.id.to_string()],
                    |row| row.get(0),
                )
                .map_err(|e| map_sqlite_err(&e))?;

            if exists {
                Err(ApplicationError::ConcurrencyConflict(format!(
                    "task {} was modified concurrently",
                    task.id
                )))
            } else {
                Err(ApplicationError::not_found("Task", task.id))
            }
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self), fields(task_id = %id))]
    async fn delete(&self, id: &TaskId) -> Result<(), ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let id = *id;

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| map_pool_err(&e))?;

            let affected = conn
                .execute("DELETE FROM tasks WHERE id = ?1", [id.to_string()])
                .map_err(|e| map_sqlite_err(&e))?;

            if affected == 0 {
                return Err(ApplicationError::not_found("Task", id));
            }

            debug!("Task deleted");
            Ok(())
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self))]
    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        batch_size: u32,
    ) -> Result<u64, ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| map_pool_err(&e))?;

            // Eligibility and stamp in one statement: two scanners running
            // this concurrently never claim the same row, because the
            // `due_notified_at IS NULL` check is evaluated under the same
            // write lock that sets it.
            let claimed = conn
                .execute(
                    "UPDATE tasks SET due_notified_at = ?1
                     WHERE id IN (
                         SELECT id FROM tasks
                         WHERE due_date < ?1
                           AND due_notified_at IS NULL
                           AND status NOT IN ('completed', 'cancelled')
                         ORDER BY due_date ASC
                         LIMIT ?2
                     )",
                    params![fmt_instant(now), batch_size],
                )
                .map_err(|e| map_sqlite_err(&e))?;

            Ok(claimed as u64)
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self))]
    async fn select_claimed_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ClaimedTask>, ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| map_pool_err(&e))?;

            let mut stmt = conn
                .prepare(
                    "SELECT id, title, due_date FROM tasks
                     WHERE due_notified_at = ?1
                     ORDER BY due_date ASC",
                )
                .map_err(|e| map_sqlite_err(&e))?;

            let rows = stmt
                .query_map([fmt_instant(now)], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })
                .map_err(|e| map_sqlite_err(&e))?;

            let mut claimed = Vec::new();
            for row in rows {
                let (id, title, due_date) = row.map_err(|e| map_sqlite_err(&e))?;
                claimed.push(ClaimedTask {
                    id: TaskId::parse(&id)
                        .map_err(|e| ApplicationError::Internal(e.to_string()))?,
                    title,
                    due_date: parse_instant(&due_date)?,
                });
            }

            Ok(claimed)
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }
}

/// Compose the WHERE clause from the query's predicate set
fn build_where(
    predicates: &[TaskPredicate],
    now: DateTime<Utc>,
) -> (String, Vec<String>) {
    let mut sql = String::from(" WHERE 1=1");
    let mut params: Vec<String> = Vec::new();

    for predicate in predicates {
        match predicate {
            TaskPredicate::ScopeAll => {}
            TaskPredicate::ScopeOwner(owner) => {
                params.push(owner.to_string());
                sql.push_str(&format!(" AND owner_id = ?{}", params.len()));
            }
            TaskPredicate::ScopeAssignee(assignee) => {
                params.push(assignee.to_string());
                sql.push_str(&format!(" AND assignee_id = ?{}", params.len()));
            }
            TaskPredicate::StatusIn(statuses) => {
                let placeholders: Vec<String> = statuses
                    .iter()
                    .map(|status| {
                        params.push(status_to_str(*status).to_string());
                        format!("?{}", params.len())
                    })
                    .collect();
                sql.push_str(&format!(" AND status IN ({})", placeholders.join(", ")));
            }
            TaskPredicate::PriorityIn(priorities) => {
                let placeholders: Vec<String> = priorities
                    .iter()
                    .map(|priority| {
                        params.push(priority_to_str(*priority).to_string());
                        format!("?{}", params.len())
                    })
                    .collect();
                sql.push_str(&format!(" AND priority IN ({})", placeholders.join(", ")));
            }
            TaskPredicate::OverdueOnly => {
                params.push(fmt_instant(now));
                sql.push_str(&format!(
                    " AND due_date < ?{} AND status NOT IN ('completed', 'cancelled')",
                    params.len()
                ));
            }
            TaskPredicate::ReminderSent(sent) => {
                params.push(i32::from(*sent).to_string());
                sql.push_str(&format!(" AND reminder_sent = ?{}", params.len()));
            }
            TaskPredicate::TitleDescMatches(term) => {
                let pattern = format!("%{}%", term.to_lowercase());
                params.push(pattern.clone());
                sql.push_str(&format!(" AND (LOWER(title) LIKE ?{}", params.len()));
                params.push(pattern);
                sql.push_str(&format!(" OR LOWER(description) LIKE ?{})", params.len()));
            }
        }
    }

    (sql, params)
}

/// ORDER BY clause for a sort key and direction, with id as tie-breaker
fn order_by(key: TaskSortKey, direction: SortDirection) -> String {
    let column = match key {
        TaskSortKey::DueDate => "due_date".to_string(),
        TaskSortKey::CreatedAt => "created_at".to_string(),
        TaskSortKey::Title => "title".to_string(),
        TaskSortKey::Priority => {
            "CASE priority WHEN 'low' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END".to_string()
        }
        TaskSortKey::Status => "CASE status WHEN 'draft' THEN 0 WHEN 'open' THEN 1 \
             WHEN 'in_progress' THEN 2 WHEN 'overdue' THEN 3 \
             WHEN 'completed' THEN 4 ELSE 5 END"
            .to_string(),
    };
    let dir = match direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    format!(" ORDER BY {column} {dir}, id ASC")
}

fn status_to_str(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Draft => "draft",
        TaskStatus::Open => "open",
        TaskStatus::InProgress => "in_progress",
        TaskStatus::Completed => "completed",
        TaskStatus::Overdue => "overdue",
        TaskStatus::Cancelled => "cancelled",
    }
}

fn status_from_str(s: &str) -> Result<TaskStatus, ApplicationError> {
    match s {
        "draft" => Ok(TaskStatus::Draft),
        "open" => Ok(TaskStatus::Open),
        "in_progress" => Ok(TaskStatus::InProgress),
        "completed" => Ok(TaskStatus::Completed),
        "overdue" => Ok(TaskStatus::Overdue),
        "cancelled" => Ok(TaskStatus::Cancelled),
        other => Err(ApplicationError::Internal(format!(
            "corrupt task status {other:?}"
        ))),
    }
}

fn priority_to_str(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "low",
        Priority::Medium => "medium",
        Priority::High => "high",
    }
}

fn priority_from_str(s: &str) -> Result<Priority, ApplicationError> {
    match s {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        other => Err(ApplicationError::Internal(format!(
            "corrupt task priority {other:?}"
        ))),
    }
}

/// Map a row (in `TASK_COLUMNS` order) to a task
///
/// Field-level decode failures surface as `ApplicationError` after the
/// rusqlite layer, hence the nested result.
fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Result<Task, ApplicationError>> {
    let id: String = row.get(0)?;
    let title: String = row.get(1)?;
    let description: String = row.get(2)?;
    let due_date: String = row.get(3)?;
    let priority: String = row.get(4)?;
    let status: String = row.get(5)?;
    let owner_id: String = row.get(6)?;
    let assignee_id: Option<String> = row.get(7)?;
    let reminder_sent: bool = row.get(8)?;
    let due_notified_at: Option<String> = row.get(9)?;
    let created_at: String = row.get(10)?;
    let updated_at: String = row.get(11)?;
    let version: String = row.get(12)?;

    Ok(decode_task(DecodedRow {
        id,
        title,
        description,
        due_date,
        priority,
        status,
        owner_id,
        assignee_id,
        reminder_sent,
        due_notified_at,
        created_at,
        updated_at,
        version,
    }))
}

struct DecodedRow {
    id: String,
    title: String,
    description: String,
    due_date: String,
    priority: String,
    status: String,
    owner_id: String,
    assignee_id: Option<String>,
    reminder_sent: bool,
    due_notified_at: Option<String>,
    created_at: String,
    updated_at: String,
    version: String,
}

fn decode_task(row: DecodedRow) -> Result<Task, ApplicationError> {
    let internal = |e: uuid::Error| ApplicationError::Internal(e.to_string());

    Ok(Task {
        id: TaskId::parse(&row.id).map_err(internal)?,
        title: row.title,
        description: row.description,
        due_date: parse_instant(&row.due_date)?,
        priority: priority_from_str(&row.priority)?,
        status: status_from_str(&row.status)?,
        owner_id: UserId::parse(&row.owner_id).map_err(internal)?,
        assignee_id: row
            .assignee_id
            .as_deref()
            .map(UserId::parse)
            .transpose()
            .map_err(internal)?,
        reminder_sent: row.reminder_sent,
        due_notified_at: row
            .due_notified_at
            .as_deref()
            .map(parse_instant)
            .transpose()?,
        created_at: parse_instant(&row.created_at)?,
        updated_at: parse_instant(&row.updated_at)?,
        version: VersionToken::parse(&row.version).map_err(internal)?,
    })
}
