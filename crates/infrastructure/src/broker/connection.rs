//! Broker connection bring-up and recovery
//!
//! One shared connection per process. Initial bring-up retries with
//! exponential backoff (2 s initial, doubling, 5 attempts) and is fatal
//! when exhausted; after startup, channel creation re-runs the same
//! bounded backoff to recover from dropped connections.

use std::time::Duration;

use lapin::{Channel, Connection, ConnectionProperties};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use application::ApplicationError;

use crate::config::BrokerConfig;

use super::map_broker_err;

/// First retry delay
const INITIAL_BACKOFF: Duration = Duration::from_secs(2);
/// Connection attempts before giving up
const MAX_ATTEMPTS: u32 = 5;

/// Shared broker connection with bounded-backoff recovery
pub struct BrokerConnection {
    uri: String,
    host: String,
    inner: RwLock<Connection>,
}

impl std::fmt::Debug for BrokerConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerConnection")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl BrokerConnection {
    /// Connect with exponential backoff; an exhausted backoff is fatal
    /// for the caller (the worker exits non-zero)
    pub async fn connect(config: &BrokerConfig) -> Result<Self, ApplicationError> {
        let uri = config.amqp_uri();
        let connection = connect_with_backoff(&uri, &config.host).await?;
        Ok(Self {
            uri,
            host: config.host.clone(),
            inner: RwLock::new(connection),
        })
    }

    /// Open a channel, reconnecting (bounded backoff) if the connection
    /// has died since the last use
    pub async fn channel(&self) -> Result<Channel, ApplicationError> {
        {
            let conn = self.inner.read().await;
            if conn.status().connected() {
                match conn.create_channel().await {
                    Ok(channel) => return Ok(channel),
                    Err(e) => warn!(error = %e, "Channel creation failed; reconnecting"),
                }
            }
        }

        let mut guard = self.inner.write().await;
        // Another caller may have reconnected while we waited
        if guard.status().connected()
            && let Ok(channel) = guard.create_channel().await
        {
            return Ok(channel);
        }

        let fresh = connect_with_backoff(&self.uri, &self.host).await?;
        *guard = fresh;
        guard.create_channel().await.map_err(|e| map_broker_err(&e))
    }
}

async fn connect_with_backoff(uri: &str, host: &str) -> Result<Connection, ApplicationError> {
    let mut delay = INITIAL_BACKOFF;

    for attempt in 1..=MAX_ATTEMPTS {
        match Connection::connect(uri, ConnectionProperties::default()).await {
            Ok(connection) => {
                info!(host, attempt, "Connected to broker");
                return Ok(connection);
            }
            Err(e) if attempt < MAX_ATTEMPTS => {
                warn!(
                    host,
                    attempt,
                    retry_in_secs = delay.as_secs(),
                    error = %e,
                    "Broker connection failed; backing off"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => {
                error!(host, attempts = MAX_ATTEMPTS, error = %e, "Broker unreachable");
                return Err(map_broker_err(&e));
            }
        }
    }

    unreachable!("loop returns on success or final failure")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_schedule_doubles_from_two_seconds() {
        let mut delay = INITIAL_BACKOFF;
        let mut schedule = Vec::new();
        for _ in 1..MAX_ATTEMPTS {
            schedule.push(delay.as_secs());
            delay *= 2;
        }
        assert_eq!(schedule, vec![2, 4, 8, 16]);
    }
}
