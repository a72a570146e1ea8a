//! Broker topology
//!
//! All declarations are durable and idempotent; both processes declare on
//! startup and whichever runs first wins. Poison messages are routed to
//! the DLQ through the default exchange via the queue's dead-letter
//! arguments, so a nack with `requeue=false` lands them there exactly
//! once.

use lapin::{
    Channel, ExchangeKind,
    options::{ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions},
    types::{AMQPValue, FieldTable},
};
use tracing::debug;

use application::ApplicationError;

use super::map_broker_err;

/// Topic exchange all task events are published to
pub const EXCHANGE: &str = "tasks.events";
/// Queue the reminder consumer reads from
pub const REMINDER_QUEUE: &str = "tasks.reminders.due";
/// Dead-letter queue for messages that failed processing
pub const DLQ_QUEUE: &str = "tasks.reminders.dlq";
/// Routing key for due-task notifications
pub const ROUTING_KEY_TASK_DUE: &str = "task.due";

/// Declare the exchange, queues, and binding
pub async fn declare_topology(channel: &Channel) -> Result<(), ApplicationError> {
    channel
        .exchange_declare(
            EXCHANGE,
            ExchangeKind::Topic,
            ExchangeDeclareOptions {
                durable: true,
                ..ExchangeDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|e| map_broker_err(&e))?;

    channel
        .queue_declare(
            DLQ_QUEUE,
            QueueDeclareOptions {
                durable: true,
                ..QueueDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|e| map_broker_err(&e))?;

    channel
        .queue_declare(
            REMINDER_QUEUE,
            QueueDeclareOptions {
                durable: true,
                ..QueueDeclareOptions::default()
            },
            dead_letter_args(),
        )
        .await
        .map_err(|e| map_broker_err(&e))?;

    channel
        .queue_bind(
            REMINDER_QUEUE,
            EXCHANGE,
            ROUTING_KEY_TASK_DUE,
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await
        .map_err(|e| map_broker_err(&e))?;

    debug!(
        exchange = EXCHANGE,
        queue = REMINDER_QUEUE,
        dlq = DLQ_QUEUE,
        "Broker topology declared"
    );
    Ok(())
}

/// Dead-letter nacked messages into the DLQ via the default exchange
fn dead_letter_args() -> FieldTable {
    let mut args = FieldTable::default();
    args.insert(
        "x-dead-letter-exchange".into(),
        AMQPValue::LongString("".into()),
    );
    args.insert(
        "x-dead-letter-routing-key".into(),
        AMQPValue::LongString(DLQ_QUEUE.into()),
    );
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable_contracts() {
        assert_eq!(EXCHANGE, "tasks.events");
        assert_eq!(REMINDER_QUEUE, "tasks.reminders.due");
        assert_eq!(DLQ_QUEUE, "tasks.reminders.dlq");
        assert_eq!(ROUTING_KEY_TASK_DUE, "task.due");
    }

    #[test]
    fn reminder_queue_dead_letters_into_the_dlq() {
        let args = dead_letter_args();
        let lookup = |name: &str| {
            args.inner()
                .iter()
                .find(|(key, _)| key.as_str() == name)
                .map(|(_, value)| value.clone())
        };
        assert_eq!(
            lookup("x-dead-letter-exchange"),
            Some(AMQPValue::LongString("".into()))
        );
        assert_eq!(
            lookup("x-dead-letter-routing-key"),
            Some(AMQPValue::LongString(DLQ_QUEUE.into()))
        );
    }
}
