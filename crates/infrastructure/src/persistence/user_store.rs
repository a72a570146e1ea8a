//! SQLite-based user persistence
//!
//! The normalized email column carries a unique index and is the upsert
//! key: `upsert_by_email` is one `INSERT .. ON CONFLICT DO UPDATE`
//! statement, not a read-then-write.

use std::sync::Arc;

use application::{
    ApplicationError, Page, PageRequest,
    ports::UserStorePort,
};
use async_trait::async_trait;
use domain::entities::User;
use domain::value_objects::{EmailAddress, UserId};
use rusqlite::{OptionalExtension, Row, params, params_from_iter};
use tokio::task;
use tracing::{debug, instrument};

use super::connection::ConnectionPool;
use super::{fmt_instant, map_pool_err, map_sqlite_err, parse_instant};

const USER_COLUMNS: &str = "id, full_name, email, telephone, created_at";

/// SQLite-based user store
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteUserStore {
    /// Create a new SQLite user store
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStorePort for SqliteUserStore {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &User) -> Result<(), ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let user = user.clone();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| map_pool_err(&e))?;

            conn.execute(
                "INSERT INTO users (id, full_name, email, telephone, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.id.to_string(),
                    user.full_name,
                    user.email.as_str(),
                    user.telephone,
                    fmt_instant(user.created_at),
                ],
            )
            .map_err(|e| map_unique_email(&e))?;

            debug!("User inserted");
            Ok(())
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn find(&self, id: &UserId) -> Result<Option<User>, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let id_str = id.to_string();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| map_pool_err(&e))?;

            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [&id_str],
                row_to_user,
            )
            .optional()
            .map_err(|e| map_sqlite_err(&e))?
            .transpose()
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self, ids))]
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, ApplicationError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let pool = Arc::clone(&self.pool);
        let id_strings: Vec<String> = ids.iter().map(ToString::to_string).collect();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| map_pool_err(&e))?;

            let placeholders: Vec<String> = (1..=id_strings.len())
                .map(|i| format!("?{i}"))
                .collect();
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users WHERE id IN ({})",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql).map_err(|e| map_sqlite_err(&e))?;
            let rows = stmt
                .query_map(params_from_iter(id_strings.iter()), row_to_user)
                .map_err(|e| map_sqlite_err(&e))?;

            let mut users = Vec::new();
            for row in rows {
                users.push(row.map_err(|e| map_sqlite_err(&e))??);
            }
            Ok(users)
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self), fields(email = %email))]
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let email = email.as_str().to_string();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| map_pool_err(&e))?;

            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                [&email],
                row_to_user,
            )
            .optional()
            .map_err(|e| map_sqlite_err(&e))?
            .transpose()
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self, full_name, telephone), fields(email = %email))]
    async fn upsert_by_email(
        &self,
        full_name: &str,
        email: &EmailAddress,
        telephone: &str,
    ) -> Result<User, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let candidate = User::new(full_name, email.clone(), telephone);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| map_pool_err(&e))?;

            conn.query_row(
                &format!(
                    "INSERT INTO users (id, full_name, email, telephone, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(email) DO UPDATE SET
                         full_name = excluded.full_name,
                         telephone = excluded.telephone
                     RETURNING {USER_COLUMNS}"
                ),
                params![
                    candidate.id.to_string(),
                    candidate.full_name,
                    candidate.email.as_str(),
                    candidate.telephone,
                    fmt_instant(candidate.created_at),
                ],
                row_to_user,
            )
            .map_err(|e| map_sqlite_err(&e))?
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn exists(&self, id: &UserId) -> Result<bool, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let id_str = id.to_string();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| map_pool_err(&e))?;

            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
                [&id_str],
                |row| row.get(0),
            )
            .map_err(|e| map_sqlite_err(&e))
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self, term))]
    async fn search<'a>(
        &self,
        term: Option<&'a str>,
        page: PageRequest,
    ) -> Result<Page<User>, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let term = term.map(ToString::to_string);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| map_pool_err(&e))?;

            let mut sql_where = String::from(" WHERE 1=1");
            let mut param_values: Vec<String> = Vec::new();

            if let Some(ref term) = term {
                let pattern = format!("%{}%", term.to_lowercase());
                param_values.push(pattern.clone());
                sql_where.push_str(&format!(" AND (LOWER(full_name) LIKE ?{}", param_values.len()));
                param_values.push(pattern);
                sql_where.push_str(&format!(" OR email LIKE ?{})", param_values.len()));
            }

            let total: u64 = conn
                .query_row(
                    &format!("SELECT COUNT(*) FROM users{sql_where}"),
                    params_from_iter(param_values.iter()),
                    |row| row.get(0),
                )
                .map_err(|e| map_sqlite_err(&e))?;

            param_values.push(page.limit().to_string());
            let limit_idx = param_values.len();
            param_values.push(page.offset().to_string());
            let offset_idx = param_values.len();

            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users{sql_where} \
                 ORDER BY full_name ASC, id ASC LIMIT ?{limit_idx} OFFSET ?{offset_idx}"
            );

            let mut stmt = conn.prepare(&sql).map_err(|e| map_sqlite_err(&e))?;
            let rows = stmt
                .query_map(params_from_iter(param_values.iter()), row_to_user)
                .map_err(|e| map_sqlite_err(&e))?;

            let mut items = Vec::new();
            for row in rows {
                items.push(row.map_err(|e| map_sqlite_err(&e))??);
            }

            Ok(Page::new(items, page, total))
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }
}

/// A violated unique email index is a caller error, not an internal one
fn map_unique_email(e: &rusqlite::Error) -> ApplicationError {
    let message = e.to_string();
    if message.contains("users.email") {
        ApplicationError::Validation("email is already in use".to_string())
    } else {
        map_sqlite_err(e)
    }
}

/// Map a row (in `USER_COLUMNS` order) to a user
fn row_to_user(row: &Row<'_>) -> rusqlite::Result<Result<User, ApplicationError>> {
    let id: String = row.get(0)?;
    let full_name: String = row.get(1)?;
    let email: String = row.get(2)?;
    let telephone: String = row.get(3)?;
    let created_at: String = row.get(4)?;

    Ok(decode_user(id, full_name, email, telephone, created_at))
}

fn decode_user(
    id: String,
    full_name: String,
    email: String,
    telephone: String,
    created_at: String,
) -> Result<User, ApplicationError> {
    Ok(User {
        id: UserId::parse(&id).map_err(|e| ApplicationError::Internal(e.to_string()))?,
        full_name,
        email: EmailAddress::new(email)
            .map_err(|e| ApplicationError::Internal(e.to_string()))?,
        telephone,
        created_at: parse_instant(&created_at)?,
    })
}
