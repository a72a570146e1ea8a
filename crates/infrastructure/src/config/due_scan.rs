//! Due-date scanner configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Smallest accepted scan interval
pub const MIN_INTERVAL_SECONDS: u64 = 5;
/// Largest accepted claim batch
pub const MAX_BATCH_SIZE: u32 = 1000;

/// Scanner loop configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DueScanConfig {
    /// Seconds between scan ticks (default 15, minimum 5)
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,

    /// Maximum rows claimed per tick (default 50, maximum 1000)
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
}

const fn default_interval_seconds() -> u64 {
    15
}

const fn default_batch_size() -> u32 {
    50
}

impl Default for DueScanConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            batch_size: default_batch_size(),
        }
    }
}

impl DueScanConfig {
    /// Clamp out-of-range values to their bounds, logging each adjustment
    #[must_use]
    pub fn clamped(self) -> Self {
        let mut clamped = self;
        if clamped.interval_seconds < MIN_INTERVAL_SECONDS {
            warn!(
                configured = clamped.interval_seconds,
                minimum = MIN_INTERVAL_SECONDS,
                "Scan interval below minimum; raising"
            );
            clamped.interval_seconds = MIN_INTERVAL_SECONDS;
        }
        if clamped.batch_size > MAX_BATCH_SIZE {
            warn!(
                configured = clamped.batch_size,
                maximum = MAX_BATCH_SIZE,
                "Scan batch size above maximum; clamping"
            );
            clamped.batch_size = MAX_BATCH_SIZE;
        }
        clamped
    }
}
