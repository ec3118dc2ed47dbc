//! Input to a snapshot validation run.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{PortfolioSnapshot, RecentRange, TradeRecord};

/// Trade plus the cash (and optionally shares) observed around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeContext {
    /// The executed trade.
    pub trade: TradeRecord,
    /// Cash before execution.
    pub cash_before: Decimal,
    /// Cash after execution.
    pub cash_after: Decimal,
    /// Held shares of the ticker before execution.
    #[serde(default)]
    pub shares_before: Option<Decimal>,
    /// Held shares of the ticker after execution.
    #[serde(default)]
    pub shares_after: Option<Decimal>,
}

impl TradeContext {
    /// Context with cash balances only.
    #[must_use]
    pub const fn new(trade: TradeRecord, cash_before: Decimal, cash_after: Decimal) -> Self {
        Self {
            trade,
            cash_before,
            cash_after,
            shares_before: None,
            shares_after: None,
        }
    }

    /// Add held-share counts so the share delta is checked too.
    #[must_use]
    pub fn with_shares(mut self, before: Decimal, after: Decimal) -> Self {
        self.shares_before = Some(before);
        self.shares_after = Some(after);
        self
    }
}

/// Equity before and after, plus fees paid in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityContext {
    /// Prior total equity.
    pub equity_before: Decimal,
    /// Current total equity.
    pub equity_after: Decimal,
    /// Fees paid between the two.
    #[serde(default)]
    pub fees: Decimal,
}

/// One snapshot and whatever context the caller has for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRequest {
    /// Snapshot under validation.
    pub snapshot: PortfolioSnapshot,
    /// Already-fetched ranges, at most one per ticker.
    #[serde(default)]
    pub ranges: Vec<RecentRange>,
    /// Trade that produced the snapshot, if any.
    #[serde(default)]
    pub trade: Option<TradeContext>,
    /// Equity pair to check for conservation, if any.
    #[serde(default)]
    pub equity: Option<EquityContext>,
}

impl ValidationRequest {
    /// Request for a bare snapshot.
    #[must_use]
    pub const fn new(snapshot: PortfolioSnapshot) -> Self {
        Self {
            snapshot,
            ranges: Vec::new(),
            trade: None,
            equity: None,
        }
    }

    /// Attach recent ranges.
    #[must_use]
    pub fn with_ranges(mut self, ranges: Vec<RecentRange>) -> Self {
        self.ranges = ranges;
        self
    }

    /// Attach a trade context.
    #[must_use]
    pub fn with_trade(mut self, trade: TradeContext) -> Self {
        self.trade = Some(trade);
        self
    }

    /// Attach an equity context.
    #[must_use]
    pub fn with_equity(mut self, equity: EquityContext) -> Self {
        self.equity = Some(equity);
        self
    }

    /// Range for `ticker`, if one was supplied.
    #[must_use]
    pub fn range_for(&self, ticker: &str) -> Option<&RecentRange> {
        self.ranges
            .iter()
            .find(|r| r.ticker().eq_ignore_ascii_case(ticker))
    }

    /// Position tickers that have no supplied range, in ledger order.
    #[must_use]
    pub fn tickers_without_range(&self) -> Vec<String> {
        self.snapshot
            .positions()
            .iter()
            .map(|p| p.ticker())
            .filter(|ticker| self.range_for(ticker).is_none())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PositionSnapshot;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tickers_without_range() {
        let positions = ["ABEO", "CSAI", "MSFT"]
            .iter()
            .map(|t| PositionSnapshot::builder(t).build().unwrap())
            .collect();
        let request = ValidationRequest::new(
            PortfolioSnapshot::new(Utc::now(), dec!(100), positions).unwrap(),
        )
        .with_ranges(vec![RecentRange::new("csai", dec!(1), dec!(2), 5).unwrap()]);

        assert_eq!(request.tickers_without_range(), vec!["ABEO", "MSFT"]);
    }
}
