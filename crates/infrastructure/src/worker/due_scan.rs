//! Periodic due-date scan loop
//!
//! Drives one claim-and-publish tick per interval. Nothing a tick does
//! can crash the loop: a not-yet-migrated store logs at debug and waits,
//! everything else logs at error and waits. Cancellation is honored
//! mid-sleep, so shutdown completes within one interval.

use std::sync::Arc;
use std::time::Duration;

use application::{ApplicationError, DueScanService};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::DueScanConfig;

/// The periodic scanner worker
pub struct DueScanWorker {
    service: Arc<DueScanService>,
    config: DueScanConfig,
}

impl std::fmt::Debug for DueScanWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DueScanWorker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DueScanWorker {
    /// Create a worker; out-of-range config values are clamped and logged
    #[must_use]
    pub fn new(service: Arc<DueScanService>, config: DueScanConfig) -> Self {
        Self {
            service,
            config: config.clamped(),
        }
    }

    /// Run until cancelled
    pub async fn run(&self, cancel: CancellationToken) {
        let interval = Duration::from_secs(self.config.interval_seconds);
        info!(
            interval_seconds = self.config.interval_seconds,
            batch_size = self.config.batch_size,
            "Due scan worker started"
        );

        loop {
            if cancel.is_cancelled() {
                break;
            }

            self.tick().await;

            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(interval) => {}
            }
        }

        info!("Due scan worker stopped");
    }

    /// One tick; errors are contained here
    async fn tick(&self) {
        let now = Utc::now();
        match self.service.run_tick(now, self.config.batch_size).await {
            Ok(outcome) if outcome.claimed > 0 => {
                info!(
                    claimed = outcome.claimed,
                    published = outcome.published,
                    "Due scan tick complete"
                );
            }
            Ok(_) => {}
            Err(ApplicationError::StoreNotReady(msg)) => {
                // Cold-start race with schema creation; the next tick retries
                debug!(reason = %msg, "Task table not available yet; skipping tick");
            }
            Err(e) => {
                error!(error = %e, "Due scan tick failed");
            }
        }
    }
}
