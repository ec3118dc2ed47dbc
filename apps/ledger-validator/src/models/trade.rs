//! Trade records as logged by the ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{ModelError, ensure_non_negative, ensure_positive, normalize_ticker};

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeAction {
    /// Buy shares (cash decreases).
    Buy,
    /// Sell shares (cash increases).
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// One executed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TradeFields")]
pub struct TradeRecord {
    timestamp: DateTime<Utc>,
    ticker: String,
    action: TradeAction,
    shares: Decimal,
    price: Decimal,
    fee: Decimal,
}

#[derive(Deserialize)]
struct TradeFields {
    timestamp: DateTime<Utc>,
    ticker: String,
    action: TradeAction,
    shares: Decimal,
    price: Decimal,
    #[serde(default)]
    fee: Decimal,
}

impl TryFrom<TradeFields> for TradeRecord {
    type Error = ModelError;

    fn try_from(f: TradeFields) -> Result<Self, Self::Error> {
        Self::new(f.timestamp, &f.ticker, f.action, f.shares, f.price)?.with_fee(f.fee)
    }
}

impl TradeRecord {
    /// Create a fee-free trade.
    pub fn new(
        timestamp: DateTime<Utc>,
        ticker: &str,
        action: TradeAction,
        shares: Decimal,
        price: Decimal,
    ) -> Result<Self, ModelError> {
        ensure_positive("shares", shares)?;
        ensure_positive("price", price)?;
        Ok(Self {
            timestamp,
            ticker: normalize_ticker(ticker)?,
            action,
            shares,
            price,
            fee: Decimal::ZERO,
        })
    }

    /// Set the commission/fee charged on the trade.
    pub fn with_fee(mut self, fee: Decimal) -> Result<Self, ModelError> {
        ensure_non_negative("fee", fee)?;
        self.fee = fee;
        Ok(self)
    }

    /// Execution timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Instrument ticker.
    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Buy or sell.
    #[must_use]
    pub const fn action(&self) -> TradeAction {
        self.action
    }

    /// Shares traded.
    #[must_use]
    pub const fn shares(&self) -> Decimal {
        self.shares
    }

    /// Execution price per share.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// Fee charged.
    #[must_use]
    pub const fn fee(&self) -> Decimal {
        self.fee
    }

    /// `shares * price`, or `None` if the product leaves decimal range.
    #[must_use]
    pub fn notional(&self) -> Option<Decimal> {
        self.shares.checked_mul(self.price)
    }

    /// Cash movement the trade should produce, or `None` on overflow.
    ///
    /// BUY: `-(notional + fee)`. SELL: `notional - fee`.
    #[must_use]
    pub fn expected_cash_delta(&self) -> Option<Decimal> {
        let notional = self.notional()?;
        match self.action {
            TradeAction::Buy => notional.checked_add(self.fee).map(|total| -total),
            TradeAction::Sell => notional.checked_sub(self.fee),
        }
    }

    /// Change in held shares the trade should produce.
    #[must_use]
    pub fn expected_share_delta(&self) -> Decimal {
        match self.action {
            TradeAction::Buy => self.shares,
            TradeAction::Sell => -self.shares,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_buy_cash_delta() {
        let trade = TradeRecord::new(Utc::now(), "ABEO", TradeAction::Buy, dec!(5), dec!(6.34))
            .unwrap();
        assert_eq!(trade.expected_cash_delta(), Some(dec!(-31.70)));
        assert_eq!(trade.expected_share_delta(), dec!(5));
    }

    #[test]
    fn test_sell_cash_delta_with_fee() {
        let trade = TradeRecord::new(Utc::now(), "ABEO", TradeAction::Sell, dec!(5), dec!(6.34))
            .unwrap()
            .with_fee(dec!(1.00))
            .unwrap();
        assert_eq!(trade.expected_cash_delta(), Some(dec!(30.70)));
        assert_eq!(trade.expected_share_delta(), dec!(-5));
    }

    #[test]
    fn test_notional_overflow_is_none() {
        let trade = TradeRecord::new(Utc::now(), "ABEO", TradeAction::Buy, Decimal::MAX, dec!(2))
            .unwrap();
        assert_eq!(trade.notional(), None);
        assert_eq!(trade.expected_cash_delta(), None);
    }

    #[test]
    fn test_rejects_zero_shares() {
        let err = TradeRecord::new(Utc::now(), "ABEO", TradeAction::Buy, dec!(0), dec!(6.34))
            .unwrap_err();
        assert!(matches!(err, ModelError::NonPositive { field: "shares", .. }));
    }

    #[test]
    fn test_rejects_negative_fee() {
        let err = TradeRecord::new(Utc::now(), "ABEO", TradeAction::Buy, dec!(1), dec!(6.34))
            .unwrap()
            .with_fee(dec!(-0.5))
            .unwrap_err();
        assert!(matches!(err, ModelError::Negative { field: "fee", .. }));
    }

    #[test]
    fn test_deserialize_defaults_fee() {
        let json = r#"{
            "timestamp": "2025-08-05T14:30:00Z",
            "ticker": "abeo",
            "action": "BUY",
            "shares": "5",
            "price": "6.34"
        }"#;

        let trade: TradeRecord = serde_json::from_str(json).unwrap();

        assert_eq!(trade.ticker(), "ABEO");
        assert_eq!(trade.action(), TradeAction::Buy);
        assert_eq!(trade.fee(), Decimal::ZERO);
    }

    #[test]
    fn test_action_display() {
        assert_eq!(TradeAction::Buy.to_string(), "BUY");
        assert_eq!(TradeAction::Sell.to_string(), "SELL");
    }
}
