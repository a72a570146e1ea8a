//! SQLite connection pooling
//!
//! One r2d2 pool per process. Connection-scoped pragmas (notably
//! `foreign_keys`, which SQLite does not persist) run through the
//! manager's init hook so every pooled connection gets them, not just
//! the first one opened.

use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Pragmas applied to every connection the pool hands out
const CONNECTION_PRAGMAS: &str = "
    PRAGMA journal_mode = WAL;
    PRAGMA foreign_keys = ON;
    PRAGMA busy_timeout = 5000;
    PRAGMA synchronous = NORMAL;
";

/// Store bring-up errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// SQLite connection pool type alias
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Pooled connection type alias
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Open the pool, apply pragmas, and bring the schema current
pub fn create_pool(config: &DatabaseConfig) -> Result<ConnectionPool, DatabaseError> {
    let path = config
        .require_path()
        .map_err(DatabaseError::Configuration)?;

    let manager =
        open_manager(path)?.with_init(|conn| conn.execute_batch(CONNECTION_PRAGMAS));

    let pool = Pool::builder()
        .max_size(config.max_connections)
        .build(manager)?;

    info!(path, connections = config.max_connections, "Task store pool ready");

    if config.run_migrations {
        crate::persistence::migrations::run_migrations(&*pool.get()?)?;
    }

    Ok(pool)
}

fn open_manager(path: &str) -> Result<SqliteConnectionManager, DatabaseError> {
    if path == ":memory:" {
        return Ok(SqliteConnectionManager::memory());
    }

    if let Some(dir) = Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        && !dir.exists()
    {
        std::fs::create_dir_all(dir).map_err(|e| {
            DatabaseError::Configuration(format!(
                "cannot create database directory {}: {e}",
                dir.display()
            ))
        })?;
    }

    Ok(SqliteConnectionManager::file(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> DatabaseConfig {
        DatabaseConfig {
            path: Some(":memory:".to_string()),
            max_connections: 1,
            run_migrations: true,
        }
    }

    #[test]
    fn in_memory_pool_opens() {
        let pool = create_pool(&memory_config()).unwrap();
        assert!(pool.get().is_ok());
    }

    #[test]
    fn every_connection_enforces_foreign_keys() {
        let pool = create_pool(&memory_config()).unwrap();
        let conn = pool.get().unwrap();
        let enabled: i32 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn missing_path_is_a_configuration_error() {
        let err = create_pool(&DatabaseConfig::default()).expect_err("path is required");
        assert!(matches!(err, DatabaseError::Configuration(_)));
    }

    #[test]
    fn file_backed_pool_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/tasks.db");
        let config = DatabaseConfig {
            path: Some(path.to_string_lossy().into_owned()),
            max_connections: 2,
            run_migrations: true,
        };
        assert!(create_pool(&config).is_ok());
        assert!(path.exists());
    }

    #[test]
    fn migrations_can_be_skipped() {
        let config = DatabaseConfig {
            run_migrations: false,
            ..memory_config()
        };
        let pool = create_pool(&config).unwrap();
        let conn = pool.get().unwrap();
        let tables: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 0);
    }
}
