//! Schema migrations
//!
//! The applied revision is tracked in SQLite's `user_version` pragma, so
//! no bookkeeping table is needed. Each entry in [`MIGRATIONS`] is one
//! revision; pending revisions apply in order, each inside its own
//! transaction together with the pragma bump.

use rusqlite::Connection;
use tracing::{debug, info};

use super::connection::DatabaseError;

/// Ordered migration scripts; revision N is `MIGRATIONS[N - 1]`
const MIGRATIONS: &[&str] = &[SCHEMA_V1];

/// Revision 1: users and tasks
///
/// Indexes follow the access patterns: the claim statement scans
/// `(due_notified_at, due_date)`, listings filter on status, owner,
/// assignee and due date, and the normalized user email is the upsert key.
const SCHEMA_V1: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        full_name TEXT NOT NULL,
        email TEXT NOT NULL,
        telephone TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS tasks (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        due_date TEXT NOT NULL,
        priority TEXT NOT NULL CHECK(priority IN ('low', 'medium', 'high')),
        status TEXT NOT NULL CHECK(status IN ('draft', 'open', 'in_progress', 'completed', 'overdue', 'cancelled')),
        owner_id TEXT NOT NULL REFERENCES users(id),
        assignee_id TEXT REFERENCES users(id),
        reminder_sent INTEGER NOT NULL DEFAULT 0,
        due_notified_at TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        version TEXT NOT NULL
    );

    CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users(email);
    CREATE INDEX IF NOT EXISTS idx_tasks_claim ON tasks(due_notified_at, due_date);
    CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
    CREATE INDEX IF NOT EXISTS idx_tasks_owner ON tasks(owner_id);
    CREATE INDEX IF NOT EXISTS idx_tasks_assignee ON tasks(assignee_id);
    CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date);
";

/// Bring the schema up to the latest revision
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let applied: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let latest = MIGRATIONS.len() as i64;

    if applied >= latest {
        debug!(revision = applied, "Schema is current");
        return Ok(());
    }

    for (index, script) in MIGRATIONS.iter().enumerate().skip(applied as usize) {
        let revision = index as i64 + 1;
        info!(revision, "Applying schema revision");

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(script)?;
        tx.pragma_update(None, "user_version", revision)?;
        tx.commit()?;
    }

    info!(revision = latest, "Schema up to date");
    Ok(())
}
