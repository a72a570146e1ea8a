//! Durable publisher for task events
//!
//! Channels are not safe for concurrent publishes, so every publish runs
//! under the channel mutex. Messages are persistent JSON with the task id
//! as message id. A failed publish is logged and surfaced as an error;
//! the scan loop swallows it and the claimed task stays claimed (the
//! reminder is lost - accepted in lieu of an outbox).

use std::sync::Arc;

use async_trait::async_trait;
use lapin::{BasicProperties, Channel, options::BasicPublishOptions};
use tokio::sync::Mutex;
use tracing::{debug, error, instrument};

use application::{ApplicationError, ports::TaskEventPublisher};
use domain::events::TaskDueV1;

use super::connection::BrokerConnection;
use super::topology::{EXCHANGE, ROUTING_KEY_TASK_DUE};
use super::map_broker_err;

/// Marks a message as persisted to disk by the broker
const DELIVERY_MODE_PERSISTENT: u8 = 2;

/// RabbitMQ-backed task event publisher
pub struct RabbitMqPublisher {
    connection: Arc<BrokerConnection>,
    channel: Mutex<Option<Channel>>,
}

impl std::fmt::Debug for RabbitMqPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RabbitMqPublisher").finish_non_exhaustive()
    }
}

impl RabbitMqPublisher {
    /// Create a publisher over the shared connection
    #[must_use]
    pub fn new(connection: Arc<BrokerConnection>) -> Self {
        Self {
            connection,
            channel: Mutex::new(None),
        }
    }
}

#[async_trait]
impl TaskEventPublisher for RabbitMqPublisher {
    #[instrument(skip(self, event), fields(task_id = %event.task_id))]
    async fn publish_task_due(&self, event: &TaskDueV1) -> Result<(), ApplicationError> {
        let (payload, properties) = encode_message(event)?;

        // Serialize channel use; lapin channels are not safe for
        // concurrent publishes. The guard is held across the frame write.
        let mut guard = self.channel.lock().await;
        let channel = match guard.as_ref() {
            Some(channel) => channel.clone(),
            None => {
                let channel = self.connection.channel().await?;
                *guard = Some(channel.clone());
                channel
            }
        };

        let result = async {
            channel
                .basic_publish(
                    EXCHANGE,
                    ROUTING_KEY_TASK_DUE,
                    BasicPublishOptions::default(),
                    &payload,
                    properties,
                )
                .await
                .map_err(|e| map_broker_err(&e))?
                .await
                .map_err(|e| map_broker_err(&e))
        }
        .await;

        match result {
            Ok(_confirmation) => {
                debug!("Published task due notification");
                Ok(())
            }
            Err(e) => {
                // Drop the channel so the next publish reopens it
                *guard = None;
                error!(error = %e, "Failed to publish task due notification");
                Err(e)
            }
        }
    }
}

/// Serialize the event and build its message properties
fn encode_message(
    event: &TaskDueV1,
) -> Result<(Vec<u8>, BasicProperties), ApplicationError> {
    let payload = serde_json::to_vec(event)
        .map_err(|e| ApplicationError::Internal(format!("serialize TaskDueV1: {e}")))?;

    let properties = BasicProperties::default()
        .with_delivery_mode(DELIVERY_MODE_PERSISTENT)
        .with_content_type("application/json".into())
        .with_message_id(event.task_id.to_string().into());

    Ok((payload, properties))
}
