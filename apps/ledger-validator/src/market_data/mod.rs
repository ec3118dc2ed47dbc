//! Market-data boundary for assembling recent ranges.
//!
//! The validator itself never fetches data. Callers that want ranges from a
//! provider go through [`fetch_ranges`] (or [`attach_missing_ranges`] for a
//! whole request), which bounds each lookup with a timeout and drops anything
//! that fails; the price check then reports the missing range as a
//! DataUnavailable warning.

mod mock;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::MarketDataConfig;
use crate::models::{ModelError, RecentRange};
use crate::validation::ValidationRequest;

pub use mock::StaticRangeProvider;

/// Market-data errors.
#[derive(Debug, Error)]
pub enum MarketDataError {
    /// Provider failed.
    #[error("Market data provider error: {message}")]
    Provider {
        /// Error details.
        message: String,
    },

    /// Provider has no data for the ticker.
    #[error("Ticker not found: {ticker}")]
    TickerNotFound {
        /// The unknown ticker.
        ticker: String,
    },

    /// Lookup exceeded its deadline.
    #[error("Range lookup for {ticker} timed out after {timeout_ms}ms")]
    Timeout {
        /// Ticker being looked up.
        ticker: String,
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// Provider returned data that is not a valid range.
    #[error("Invalid range data: {0}")]
    InvalidData(#[from] ModelError),
}

/// Source of recent trading ranges.
#[async_trait]
pub trait RangeProvider: Send + Sync {
    /// Recent range for one ticker.
    async fn recent_range(&self, ticker: &str) -> Result<RecentRange, MarketDataError>;
}

/// Look up one range, bounded by `timeout`.
pub async fn fetch_range<P: RangeProvider + ?Sized>(
    provider: &P,
    ticker: &str,
    timeout: Duration,
) -> Result<RecentRange, MarketDataError> {
    match tokio::time::timeout(timeout, provider.recent_range(ticker)).await {
        Ok(result) => result,
        Err(_) => Err(MarketDataError::Timeout {
            ticker: ticker.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

/// Look up ranges for every ticker; failed or late lookups are logged and omitted.
pub async fn fetch_ranges<P, I, S>(provider: &P, tickers: I, timeout: Duration) -> Vec<RecentRange>
where
    P: RangeProvider + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ranges = Vec::new();

    for ticker in tickers {
        let ticker = ticker.as_ref();
        match fetch_range(provider, ticker, timeout).await {
            Ok(range) => ranges.push(range),
            Err(e) => {
                tracing::warn!(ticker, error = %e, "Range unavailable, price check will be unverified");
            }
        }
    }

    ranges
}

/// Fetch ranges for every position in `request` that has none yet.
///
/// Ranges the caller already supplied are kept as-is.
pub async fn attach_missing_ranges<P: RangeProvider + ?Sized>(
    provider: &P,
    mut request: ValidationRequest,
    config: &MarketDataConfig,
) -> ValidationRequest {
    let missing = request.tickers_without_range();
    if missing.is_empty() {
        return request;
    }

    let fetched = fetch_ranges(provider, &missing, config.range_timeout()).await;
    tracing::debug!(
        requested = missing.len(),
        fetched = fetched.len(),
        "Attached recent ranges"
    );
    request.ranges.extend(fetched);
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PortfolioSnapshot, PositionSnapshot};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn provider() -> StaticRangeProvider {
        let provider = StaticRangeProvider::new();
        provider.set_range(RecentRange::new("ABEO", dec!(5.10), dec!(6.20), 5).unwrap());
        provider.set_range(RecentRange::new("CSAI", dec!(1.00), dec!(1.40), 5).unwrap());
        provider
    }

    #[tokio::test]
    async fn test_fetch_ranges_skips_unknown() {
        let ranges = fetch_ranges(&provider(), ["ABEO", "ZZZZ", "CSAI"], Duration::from_secs(1)).await;

        let tickers: Vec<&str> = ranges.iter().map(RecentRange::ticker).collect();
        assert_eq!(tickers, vec!["ABEO", "CSAI"]);
    }

    #[tokio::test]
    async fn test_fetch_range_times_out() {
        let provider = provider().with_delay(Duration::from_millis(200));

        let err = fetch_range(&provider, "ABEO", Duration::from_millis(10))
            .await
            .unwrap_err();

        assert!(matches!(err, MarketDataError::Timeout { timeout_ms: 10, .. }));
    }

    #[tokio::test]
    async fn test_fetch_ranges_drops_timeouts() {
        let provider = provider().with_delay(Duration::from_millis(200));
        let ranges = fetch_ranges(&provider, vec!["ABEO".to_string()], Duration::from_millis(10)).await;
        assert!(ranges.is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_is_omitted() {
        let provider = provider();
        provider.fail_with("ABEO", "rate limited");

        let ranges = fetch_ranges(&provider, ["ABEO", "CSAI"], Duration::from_secs(1)).await;

        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].ticker(), "CSAI");
    }

    fn request(tickers: &[&str]) -> ValidationRequest {
        let positions = tickers
            .iter()
            .map(|t| PositionSnapshot::builder(t).build().unwrap())
            .collect();
        ValidationRequest::new(PortfolioSnapshot::new(Utc::now(), dec!(100), positions).unwrap())
    }

    #[tokio::test]
    async fn test_attach_missing_ranges_keeps_supplied() {
        let supplied = RecentRange::new("ABEO", dec!(4.00), dec!(7.00), 20).unwrap();
        let request = request(&["ABEO", "CSAI", "ZZZZ"]).with_ranges(vec![supplied.clone()]);

        let request = attach_missing_ranges(&provider(), request, &MarketDataConfig::default()).await;

        assert_eq!(request.range_for("ABEO"), Some(&supplied));
        assert_eq!(request.range_for("CSAI").map(RecentRange::high), Some(dec!(1.40)));
        assert!(request.range_for("ZZZZ").is_none());
    }

    #[tokio::test]
    async fn test_attach_missing_ranges_honors_configured_timeout() {
        let provider = provider().with_delay(Duration::from_millis(200));
        let config = MarketDataConfig {
            range_timeout_ms: 10,
        };

        let request = attach_missing_ranges(&provider, request(&["ABEO"]), &config).await;

        assert!(request.ranges.is_empty());
    }
}
