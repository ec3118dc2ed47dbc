//! Market-data inputs: quotes, daily bars, and recent trading ranges.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::{ModelError, ensure_non_negative, normalize_ticker};
use super::portfolio::PositionSnapshot;

/// A quoted price for one instrument at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuoteFields")]
pub struct InstrumentQuote {
    ticker: String,
    price: Decimal,
    as_of: DateTime<Utc>,
}

#[derive(Deserialize)]
struct QuoteFields {
    ticker: String,
    price: Decimal,
    as_of: DateTime<Utc>,
}

impl TryFrom<QuoteFields> for InstrumentQuote {
    type Error = ModelError;

    fn try_from(fields: QuoteFields) -> Result<Self, Self::Error> {
        Self::new(&fields.ticker, fields.price, fields.as_of)
    }
}

impl InstrumentQuote {
    /// Create a quote.
    ///
    /// A zero price is accepted here: a stale zero is exactly the kind of
    /// feed corruption the price band check reports.
    pub fn new(ticker: &str, price: Decimal, as_of: DateTime<Utc>) -> Result<Self, ModelError> {
        ensure_non_negative("price", price)?;
        Ok(Self {
            ticker: normalize_ticker(ticker)?,
            price,
            as_of,
        })
    }

    /// Quote for a position's mark price.
    ///
    /// The position's ticker and price were validated when it was built, so
    /// this cannot fail.
    #[must_use]
    pub fn for_position(position: &PositionSnapshot, as_of: DateTime<Utc>) -> Self {
        Self {
            ticker: position.ticker().to_string(),
            price: position.current_price(),
            as_of,
        }
    }

    /// Instrument ticker.
    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Quoted price.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// Quote timestamp.
    #[must_use]
    pub const fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }
}

/// One daily OHLC bar from the market-data provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBar {
    /// Session date.
    pub date: NaiveDate,
    /// Opening price.
    pub open: Decimal,
    /// Session high.
    pub high: Decimal,
    /// Session low.
    pub low: Decimal,
    /// Closing price.
    pub close: Decimal,
}

/// Recent trading range for an instrument, derived from historical bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RangeFields")]
pub struct RecentRange {
    ticker: String,
    low: Decimal,
    high: Decimal,
    window_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_close: Option<Decimal>,
}

#[derive(Deserialize)]
struct RangeFields {
    ticker: String,
    low: Decimal,
    high: Decimal,
    window_days: u32,
    #[serde(default)]
    last_close: Option<Decimal>,
}

impl TryFrom<RangeFields> for RecentRange {
    type Error = ModelError;

    fn try_from(fields: RangeFields) -> Result<Self, Self::Error> {
        let range = Self::new(&fields.ticker, fields.low, fields.high, fields.window_days)?;
        match fields.last_close {
            Some(close) => range.with_last_close(close),
            None => Ok(range),
        }
    }
}

impl RecentRange {
    /// Create a range from explicit bounds.
    pub fn new(
        ticker: &str,
        low: Decimal,
        high: Decimal,
        window_days: u32,
    ) -> Result<Self, ModelError> {
        let ticker = normalize_ticker(ticker)?;
        ensure_non_negative("low", low)?;
        if low > high {
            return Err(ModelError::InvertedRange { ticker, low, high });
        }
        if window_days == 0 {
            return Err(ModelError::EmptyWindow(ticker));
        }
        Ok(Self {
            ticker,
            low,
            high,
            window_days,
            last_close: None,
        })
    }

    /// Attach the most recent close.
    pub fn with_last_close(mut self, close: Decimal) -> Result<Self, ModelError> {
        ensure_non_negative("last_close", close)?;
        self.last_close = Some(close);
        Ok(self)
    }

    /// Derive a range from daily bars: lowest low, highest high, last close.
    ///
    /// Bars are expected in chronological order; the last bar supplies the close.
    pub fn from_bars(ticker: &str, bars: &[DailyBar]) -> Result<Self, ModelError> {
        let Some(last) = bars.last() else {
            return Err(ModelError::EmptyWindow(normalize_ticker(ticker)?));
        };

        let low = bars.iter().map(|b| b.low).min().unwrap_or(last.low);
        let high = bars.iter().map(|b| b.high).max().unwrap_or(last.high);
        let window_days = u32::try_from(bars.len()).unwrap_or(u32::MAX);

        Self::new(ticker, low, high, window_days)?.with_last_close(last.close)
    }

    /// Instrument ticker.
    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Lowest price in the window.
    #[must_use]
    pub const fn low(&self) -> Decimal {
        self.low
    }

    /// Highest price in the window.
    #[must_use]
    pub const fn high(&self) -> Decimal {
        self.high
    }

    /// Number of trading days covered.
    #[must_use]
    pub const fn window_days(&self) -> u32 {
        self.window_days
    }

    /// Most recent close, when the provider supplied one.
    #[must_use]
    pub const fn last_close(&self) -> Option<Decimal> {
        self.last_close
    }
}
