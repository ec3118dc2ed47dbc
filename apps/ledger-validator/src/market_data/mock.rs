//! Static range provider for tests and offline runs.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;

use super::{MarketDataError, RangeProvider};
use crate::models::{DailyBar, ModelError, RecentRange};

/// Serves preloaded ranges, optionally after a fixed delay.
#[derive(Debug, Default)]
pub struct StaticRangeProvider {
    ranges: RwLock<HashMap<String, RecentRange>>,
    failures: RwLock<HashMap<String, String>>,
    delay: Option<Duration>,
}

impl StaticRangeProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider serving ranges derived from per-ticker daily bars, as loaded
    /// from a bar-history file.
    pub fn from_bars(history: &BTreeMap<String, Vec<DailyBar>>) -> Result<Self, ModelError> {
        let provider = Self::new();
        for (ticker, bars) in history {
            provider.set_bars(ticker, bars)?;
        }
        Ok(provider)
    }

    /// Delay every lookup by `delay`.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Serve `range` for its ticker.
    pub fn set_range(&self, range: RecentRange) {
        if let Ok(mut ranges) = self.ranges.write() {
            ranges.insert(range.ticker().to_string(), range);
        }
    }

    /// Derive and serve a range from daily bars.
    pub fn set_bars(&self, ticker: &str, bars: &[DailyBar]) -> Result<(), ModelError> {
        self.set_range(RecentRange::from_bars(ticker, bars)?);
        Ok(())
    }

    /// Fail lookups for `ticker` with a provider error.
    pub fn fail_with(&self, ticker: &str, message: &str) {
        if let Ok(mut failures) = self.failures.write() {
            failures.insert(ticker.to_uppercase(), message.to_string());
        }
    }
}

#[async_trait]
impl RangeProvider for StaticRangeProvider {
    async fn recent_range(&self, ticker: &str) -> Result<RecentRange, MarketDataError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let key = ticker.trim().to_uppercase();
        let poisoned = || MarketDataError::Provider {
            message: "provider state poisoned".to_string(),
        };

        if let Some(message) = self.failures.read().map_err(|_| poisoned())?.get(&key) {
            return Err(MarketDataError::Provider {
                message: message.clone(),
            });
        }

        self.ranges
            .read()
            .map_err(|_| poisoned())?
            .get(&key)
            .cloned()
            .ok_or(MarketDataError::TickerNotFound { ticker: key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let provider = StaticRangeProvider::new();
        provider.set_range(RecentRange::new("ABEO", dec!(5), dec!(6), 5).unwrap());

        let range = provider.recent_range("abeo").await.unwrap();
        assert_eq!(range.high(), dec!(6));
    }

    #[tokio::test]
    async fn test_unknown_ticker() {
        let err = StaticRangeProvider::new().recent_range("ZZZZ").await.unwrap_err();
        assert!(matches!(err, MarketDataError::TickerNotFound { .. }));
    }

    #[tokio::test]
    async fn test_set_bars() {
        let provider = StaticRangeProvider::new();
        let bars = vec![DailyBar {
            date: NaiveDate::from_ymd_opt(2025, 8, 5).unwrap(),
            open: dec!(5.60),
            high: dec!(6.05),
            low: dec!(5.50),
            close: dec!(5.77),
        }];
        provider.set_bars("ABEO", &bars).unwrap();

        let range = provider.recent_range("ABEO").await.unwrap();
        assert_eq!(range.last_close(), Some(dec!(5.77)));
        assert_eq!(range.window_days(), 1);
    }

    #[tokio::test]
    async fn test_from_bar_history_json() {
        let history: BTreeMap<String, Vec<DailyBar>> = serde_json::from_str(
            r#"{
                "abeo": [
                    {"date": "2025-08-04", "open": "5.60", "high": "5.90", "low": "5.40", "close": "5.60"},
                    {"date": "2025-08-05", "open": "5.60", "high": "6.05", "low": "5.50", "close": "5.77"}
                ]
            }"#,
        )
        .unwrap();

        let provider = StaticRangeProvider::from_bars(&history).unwrap();
        let range = provider.recent_range("ABEO").await.unwrap();

        assert_eq!(range.low(), dec!(5.40));
        assert_eq!(range.high(), dec!(6.05));
        assert_eq!(range.window_days(), 2);
    }

    #[test]
    fn test_from_bars_rejects_empty_history() {
        let history = BTreeMap::from([("ABEO".to_string(), Vec::new())]);
        let err = StaticRangeProvider::from_bars(&history).unwrap_err();
        assert_eq!(err, ModelError::EmptyWindow("ABEO".to_string()));
    }
}
