#![forbid(unsafe_code)]
//! Infrastructure layer - Adapters for external systems
//!
//! Implements the ports defined in the application layer: SQLite
//! persistence, the RabbitMQ broker adapter, and the due-scan worker loop.

pub mod broker;
pub mod config;
pub mod persistence;
pub mod worker;

pub use broker::{
    BrokerConnection, DueConsumer, RabbitMqPublisher, declare_topology,
    DLQ_QUEUE, EXCHANGE, ROUTING_KEY_TASK_DUE, REMINDER_QUEUE,
};
pub use config::{
    AppConfig, BrokerConfig, CorsConfig, DatabaseConfig, DueScanConfig, ServerConfig,
};
pub use persistence::{
    ConnectionPool, DatabaseError, SqliteTaskStore, SqliteUserStore, create_pool,
};
pub use worker::DueScanWorker;
