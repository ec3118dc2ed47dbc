//! Market-data lookup configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounds on range lookups through a `RangeProvider`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketDataConfig {
    /// Per-ticker lookup timeout in milliseconds.
    #[serde(default = "default_range_timeout_ms")]
    pub range_timeout_ms: u64,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            range_timeout_ms: default_range_timeout_ms(),
        }
    }
}

impl MarketDataConfig {
    /// Lookup timeout as a `Duration`.
    #[must_use]
    pub const fn range_timeout(&self) -> Duration {
        Duration::from_millis(self.range_timeout_ms)
    }
}

const fn default_range_timeout_ms() -> u64 {
    5000
}
