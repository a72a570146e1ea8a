//! Store (SQLite) configuration.

use serde::{Deserialize, Serialize};

use super::default_true;

/// SQLite store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file; required at process start
    #[serde(default)]
    pub path: Option<String>,

    /// Maximum number of concurrent database connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Whether to run pending migrations on startup (default: true)
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: default_max_connections(),
            run_migrations: true,
        }
    }
}

impl DatabaseConfig {
    /// The configured path, or an error suitable for fatal startup handling
    pub fn require_path(&self) -> Result<&str, String> {
        self.path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| "database.path is required".to_string())
    }
}
