//! Construction-time errors for ledger models.
//!
//! These are raised when a value cannot represent a valid ledger fact at all
//! (negative share counts, zero-width windows). They are distinct from a
//! validation FAIL, which is reported as data in a `ValidationReport`.

use rust_decimal::Decimal;

/// Errors from constructing or deserializing ledger models.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Ticker is empty or whitespace.
    #[error("Ticker must not be empty")]
    EmptyTicker,

    /// A field that must be non-negative was negative.
    #[error("{field} must be non-negative, got {value}")]
    Negative {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: Decimal,
    },

    /// A field that must be strictly positive was zero or negative.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: Decimal,
    },

    /// Range bounds are inverted.
    #[error("Range low {low} exceeds high {high} for {ticker}")]
    InvertedRange {
        /// Instrument the range belongs to.
        ticker: String,
        /// Lower bound.
        low: Decimal,
        /// Upper bound.
        high: Decimal,
    },

    /// A recent-range window must cover at least one day.
    #[error("Range window for {0} must cover at least one day")]
    EmptyWindow(String),
}

/// Reject negative values.
pub(crate) fn ensure_non_negative(field: &'static str, value: Decimal) -> Result<(), ModelError> {
    if value < Decimal::ZERO {
        return Err(ModelError::Negative { field, value });
    }
    Ok(())
}

/// Reject zero and negative values.
pub(crate) fn ensure_positive(field: &'static str, value: Decimal) -> Result<(), ModelError> {
    if value <= Decimal::ZERO {
        return Err(ModelError::NonPositive { field, value });
    }
    Ok(())
}

/// Reject empty tickers and normalize surrounding whitespace.
pub(crate) fn normalize_ticker(ticker: &str) -> Result<String, ModelError> {
    let trimmed = ticker.trim();
    if trimmed.is_empty() {
        return Err(ModelError::EmptyTicker);
    }
    Ok(trimmed.to_uppercase())
}
