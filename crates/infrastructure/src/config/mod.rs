//! Application configuration
//!
//! Split into focused sub-modules by concern:
//! - `server`: HTTP server and CORS settings
//! - `database`: SQLite store settings
//! - `broker`: RabbitMQ connection settings
//! - `due_scan`: scanner interval and batch size

mod broker;
mod database;
mod due_scan;
mod server;

use serde::{Deserialize, Serialize};

pub use broker::BrokerConfig;
pub use database::DatabaseConfig;
pub use due_scan::DueScanConfig;
pub use server::{CorsConfig, ServerConfig};

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Main application configuration
///
/// Loaded from `config.toml` (optional) with `TASKBOARD_*` environment
/// overrides. Both the API server and the worker read the same file; each
/// consumes the sections it needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Store configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Broker configuration
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Due-date scanner configuration
    #[serde(default)]
    pub due_scan: DueScanConfig,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (e.g., TASKBOARD_SERVER__PORT)
            .add_source(
                config::Environment::with_prefix("TASKBOARD")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
