//! Reminder consumer
//!
//! Prefetch-1, manual ack. A deserializable message produces exactly one
//! reminder log line and an ack; anything else is nacked without requeue
//! and dead-letters into the DLQ. Requeue is never used, so a poison
//! message cannot storm the queue.

use futures::StreamExt;
use lapin::{
    message::Delivery,
    options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions},
    types::FieldTable,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use application::ApplicationError;
use domain::events::TaskDueV1;

use super::connection::BrokerConnection;
use super::topology::{REMINDER_QUEUE, declare_topology};
use super::map_broker_err;

/// Consumer tag identifying this process on the queue
const CONSUMER_TAG: &str = "taskboard-reminder-consumer";

/// What to do with a delivery
#[derive(Debug, Clone, PartialEq, Eq)]
enum Disposition {
    /// Processed; acknowledge
    Ack,
    /// Poison; nack without requeue so it dead-letters
    DeadLetter,
}

/// The reminder consumer loop
pub struct DueConsumer {
    connection: std::sync::Arc<BrokerConnection>,
}

impl std::fmt::Debug for DueConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DueConsumer").finish_non_exhaustive()
    }
}

impl DueConsumer {
    /// Create a consumer over the shared connection
    #[must_use]
    pub fn new(connection: std::sync::Arc<BrokerConnection>) -> Self {
        Self { connection }
    }

    /// Consume until cancellation
    ///
    /// When the delivery stream ends (connection lost), the loop obtains
    /// a fresh channel - which reconnects with bounded backoff - and
    /// resumes. Unacked in-flight deliveries are redelivered by the
    /// broker after reconnection.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), ApplicationError> {
        while !cancel.is_cancelled() {
            match self.consume_once(&cancel).await {
                Ok(()) => break,
                Err(e) => {
                    if cancel.is_cancelled() {
                        break;
                    }
                    warn!(error = %e, "Consumer stream failed; reconnecting");
                }
            }
        }
        info!("Reminder consumer stopped");
        Ok(())
    }

    /// One consume session over one channel; returns Ok on cancellation
    async fn consume_once(&self, cancel: &CancellationToken) -> Result<(), ApplicationError> {
        let channel = self.connection.channel().await?;
        declare_topology(&channel).await?;

        channel
            .basic_qos(1, BasicQosOptions::default())
            .await
            .map_err(|e| map_broker_err(&e))?;

        let mut consumer = channel
            .basic_consume(
                REMINDER_QUEUE,
                CONSUMER_TAG,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| map_broker_err(&e))?;

        info!(queue = REMINDER_QUEUE, "Reminder consumer started");

        loop {
            let delivery = tokio::select! {
                () = cancel.cancelled() => return Ok(()),
                next = consumer.next() => next,
            };

            match delivery {
                Some(Ok(delivery)) => handle_delivery(delivery).await?,
                Some(Err(e)) => return Err(map_broker_err(&e)),
                None => {
                    return Err(ApplicationError::ExternalService(
                        "delivery stream closed".to_string(),
                    ));
                }
            }
        }
    }
}

#[instrument(skip(delivery), fields(delivery_tag = delivery.delivery_tag))]
async fn handle_delivery(delivery: Delivery) -> Result<(), ApplicationError> {
    let message_id = delivery
        .properties
        .message_id()
        .as_ref()
        .map(|id| id.as_str().to_string())
        .unwrap_or_default();

    match classify(&delivery.data) {
        (Disposition::Ack, Some(event)) => {
            // The consumer's only processing side-effect
            info!(
                task_id = %event.task_id,
                message_id = %message_id,
                title = %event.title,
                "Task due notification processed"
            );
            delivery
                .ack(BasicAckOptions::default())
                .await
                .map_err(|e| map_broker_err(&e))
        }
        _ => {
            error!(message_id = %message_id, "Undeserializable reminder message; dead-lettering");
            delivery
                .nack(BasicNackOptions {
                    requeue: false,
                    ..BasicNackOptions::default()
                })
                .await
                .map_err(|e| map_broker_err(&e))
        }
    }
}

/// Decide a delivery's fate from its body alone
fn classify(data: &[u8]) -> (Disposition, Option<TaskDueV1>) {
    match serde_json::from_slice::<TaskDueV1>(data) {
        Ok(event) => (Disposition::Ack, Some(event)),
        Err(_) => (Disposition::DeadLetter, None),
    }
}
