//! SQLite persistence adapters
//!
//! Implements the application-layer store ports. All statements run on the
//! blocking pool; each logical operation borrows one pooled connection for
//! its duration and nothing holds a transaction across calls.

mod connection;
mod migrations;
mod task_store;
mod user_store;

pub use connection::{ConnectionPool, DatabaseError, PooledConn, create_pool};
pub use migrations::run_migrations;
pub use task_store::SqliteTaskStore;
pub use user_store::SqliteUserStore;

use chrono::{DateTime, SecondsFormat, Utc};

use application::ApplicationError;

/// Fixed-width RFC 3339 rendering (UTC, microseconds)
///
/// Instants are stored as TEXT; a fixed fractional width keeps
/// lexicographic order identical to chronological order, and makes the
/// claim marker comparable by string equality.
pub(crate) fn fmt_instant(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse an instant stored by [`fmt_instant`]
pub(crate) fn parse_instant(s: &str) -> Result<DateTime<Utc>, ApplicationError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| ApplicationError::Internal(format!("corrupt instant {s:?}: {e}")))
}

/// Map a SQLite error to the application taxonomy
///
/// A missing table is the cold-start race with schema creation and gets
/// its own retryable variant; everything else is internal.
pub(crate) fn map_sqlite_err(e: &rusqlite::Error) -> ApplicationError {
    let message = e.to_string();
    if message.contains("no such table") {
        ApplicationError::StoreNotReady(message)
    } else {
        ApplicationError::Internal(message)
    }
}

/// Map a pool checkout failure
pub(crate) fn map_pool_err(e: &r2d2::Error) -> ApplicationError {
    ApplicationError::ExternalService(format!("connection pool: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn instants_roundtrip() {
        let t = Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_instant(&fmt_instant(t)).unwrap(), t);
    }

    #[test]
    fn formatted_instants_order_lexicographically() {
        let early = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let late = early + chrono::Duration::microseconds(1);
        assert!(fmt_instant(early) < fmt_instant(late));
    }

    #[test]
    fn missing_table_maps_to_store_not_ready() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err = conn
            .execute("SELECT * FROM tasks", [])
            .expect_err("table must be absent");
        assert!(matches!(
            map_sqlite_err(&err),
            ApplicationError::StoreNotReady(_)
        ));
    }

    #[test]
    fn corrupt_instant_is_internal() {
        assert!(matches!(
            parse_instant("yesterday"),
            Err(ApplicationError::Internal(_))
        ));
    }
}
