//! RabbitMQ broker adapter
//!
//! Owns the process-wide connection, declares the durable topology on
//! startup, publishes persistent messages under a channel mutex, and
//! drives the single-prefetch reminder consumer with manual ack and
//! nack-to-DLQ.

mod connection;
mod consumer;
mod publisher;
mod topology;

pub use connection::BrokerConnection;
pub use consumer::DueConsumer;
pub use publisher::RabbitMqPublisher;
pub use topology::{DLQ_QUEUE, EXCHANGE, REMINDER_QUEUE, ROUTING_KEY_TASK_DUE, declare_topology};

use application::ApplicationError;

/// Map a lapin error to the application taxonomy
pub(crate) fn map_broker_err(e: &lapin::Error) -> ApplicationError {
    ApplicationError::ExternalService(format!("broker: {e}"))
}
