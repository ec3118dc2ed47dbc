//! Portfolio state as read from the ledger.
//!
//! Snapshots are built by the ledger collaborator once per run and handed to
//! the validator read-only. The `reported_*` fields are what the ledger claims;
//! the validator recomputes them from primitives.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::{ModelError, ensure_non_negative, normalize_ticker};

/// One held position as recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PositionFields")]
pub struct PositionSnapshot {
    ticker: String,
    shares: Decimal,
    cost_basis: Decimal,
    current_price: Decimal,
    reported_total_value: Decimal,
    reported_pnl: Decimal,
    stop_loss_price: Decimal,
}

#[derive(Deserialize)]
struct PositionFields {
    ticker: String,
    shares: Decimal,
    cost_basis: Decimal,
    current_price: Decimal,
    reported_total_value: Decimal,
    reported_pnl: Decimal,
    #[serde(default)]
    stop_loss_price: Decimal,
}

impl TryFrom<PositionFields> for PositionSnapshot {
    type Error = ModelError;

    fn try_from(f: PositionFields) -> Result<Self, Self::Error> {
        Self::builder(&f.ticker)
            .shares(f.shares)
            .cost_basis(f.cost_basis)
            .current_price(f.current_price)
            .reported_total_value(f.reported_total_value)
            .reported_pnl(f.reported_pnl)
            .stop_loss_price(f.stop_loss_price)
            .build()
    }
}

impl PositionSnapshot {
    /// Start building a position for `ticker`.
    #[must_use]
    pub fn builder(ticker: &str) -> PositionBuilder {
        PositionBuilder {
            ticker: ticker.to_string(),
            shares: Decimal::ZERO,
            cost_basis: Decimal::ZERO,
            current_price: Decimal::ZERO,
            reported_total_value: Decimal::ZERO,
            reported_pnl: Decimal::ZERO,
            stop_loss_price: Decimal::ZERO,
        }
    }

    /// Instrument ticker.
    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Shares held.
    #[must_use]
    pub const fn shares(&self) -> Decimal {
        self.shares
    }

    /// Cumulative amount paid for the held shares.
    #[must_use]
    pub const fn cost_basis(&self) -> Decimal {
        self.cost_basis
    }

    /// Mark price used for valuation.
    #[must_use]
    pub const fn current_price(&self) -> Decimal {
        self.current_price
    }

    /// Market value as recorded by the ledger.
    #[must_use]
    pub const fn reported_total_value(&self) -> Decimal {
        self.reported_total_value
    }

    /// Unrealized P&L as recorded by the ledger.
    #[must_use]
    pub const fn reported_pnl(&self) -> Decimal {
        self.reported_pnl
    }

    /// Stop-loss level (zero when none is set).
    #[must_use]
    pub const fn stop_loss_price(&self) -> Decimal {
        self.stop_loss_price
    }

    /// `shares * current_price`, or `None` if the product leaves decimal range.
    #[must_use]
    pub fn expected_value(&self) -> Option<Decimal> {
        self.shares.checked_mul(self.current_price)
    }

    /// P&L implied by the ledger's own valuation: `reported_total_value - cost_basis`.
    ///
    /// The value itself is checked separately, so a half-cent rounding in the
    /// reported value does not count twice against the P&L.
    #[must_use]
    pub fn expected_pnl(&self) -> Option<Decimal> {
        self.reported_total_value.checked_sub(self.cost_basis)
    }
}

/// Builder for [`PositionSnapshot`]; validation runs in [`PositionBuilder::build`].
#[derive(Debug, Clone)]
pub struct PositionBuilder {
    ticker: String,
    shares: Decimal,
    cost_basis: Decimal,
    current_price: Decimal,
    reported_total_value: Decimal,
    reported_pnl: Decimal,
    stop_loss_price: Decimal,
}

impl PositionBuilder {
    /// Shares held.
    #[must_use]
    pub fn shares(mut self, shares: Decimal) -> Self {
        self.shares = shares;
        self
    }

    /// Cost basis.
    #[must_use]
    pub fn cost_basis(mut self, cost_basis: Decimal) -> Self {
        self.cost_basis = cost_basis;
        self
    }

    /// Mark price.
    #[must_use]
    pub fn current_price(mut self, price: Decimal) -> Self {
        self.current_price = price;
        self
    }

    /// Ledger-reported market value.
    #[must_use]
    pub fn reported_total_value(mut self, value: Decimal) -> Self {
        self.reported_total_value = value;
        self
    }

    /// Ledger-reported P&L.
    #[must_use]
    pub fn reported_pnl(mut self, pnl: Decimal) -> Self {
        self.reported_pnl = pnl;
        self
    }

    /// Stop-loss level.
    #[must_use]
    pub fn stop_loss_price(mut self, price: Decimal) -> Self {
        self.stop_loss_price = price;
        self
    }

    /// Validate and build the position.
    pub fn build(self) -> Result<PositionSnapshot, ModelError> {
        ensure_non_negative("shares", self.shares)?;
        ensure_non_negative("current_price", self.current_price)?;
        ensure_non_negative("stop_loss_price", self.stop_loss_price)?;

        Ok(PositionSnapshot {
            ticker: normalize_ticker(&self.ticker)?,
            shares: self.shares,
            cost_basis: self.cost_basis,
            current_price: self.current_price,
            reported_total_value: self.reported_total_value,
            reported_pnl: self.reported_pnl,
            stop_loss_price: self.stop_loss_price,
        })
    }
}

/// Totals row as recorded by the ledger. Each field is checked only when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedTotals {
    /// Sum of position market values.
    #[serde(default)]
    pub total_value: Option<Decimal>,
    /// Sum of position P&L.
    #[serde(default)]
    pub total_pnl: Option<Decimal>,
    /// Cash plus position market values.
    #[serde(default)]
    pub total_equity: Option<Decimal>,
}

/// Point-in-time portfolio state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PortfolioFields")]
pub struct PortfolioSnapshot {
    timestamp: DateTime<Utc>,
    cash: Decimal,
    positions: Vec<PositionSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reported_totals: Option<ReportedTotals>,
}

#[derive(Deserialize)]
struct PortfolioFields {
    timestamp: DateTime<Utc>,
    cash: Decimal,
    #[serde(default)]
    positions: Vec<PositionSnapshot>,
    #[serde(default)]
    reported_totals: Option<ReportedTotals>,
}

impl TryFrom<PortfolioFields> for PortfolioSnapshot {
    type Error = ModelError;

    fn try_from(f: PortfolioFields) -> Result<Self, Self::Error> {
        let snapshot = Self::new(f.timestamp, f.cash, f.positions)?;
        Ok(match f.reported_totals {
            Some(totals) => snapshot.with_reported_totals(totals),
            None => snapshot,
        })
    }
}

impl PortfolioSnapshot {
    /// Create a snapshot. Cash may not be negative (the ledger has no margin).
    pub fn new(
        timestamp: DateTime<Utc>,
        cash: Decimal,
        positions: Vec<PositionSnapshot>,
    ) -> Result<Self, ModelError> {
        ensure_non_negative("cash", cash)?;
        Ok(Self {
            timestamp,
            cash,
            positions,
            reported_totals: None,
        })
    }

    /// Attach the ledger's totals row.
    #[must_use]
    pub fn with_reported_totals(mut self, totals: ReportedTotals) -> Self {
        self.reported_totals = Some(totals);
        self
    }

    /// Snapshot timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Cash balance.
    #[must_use]
    pub const fn cash(&self) -> Decimal {
        self.cash
    }

    /// Positions in ledger order.
    #[must_use]
    pub fn positions(&self) -> &[PositionSnapshot] {
        &self.positions
    }

    /// Ledger totals row, if any.
    #[must_use]
    pub const fn reported_totals(&self) -> Option<&ReportedTotals> {
        self.reported_totals.as_ref()
    }

    /// Look up a position by ticker.
    #[must_use]
    pub fn position(&self, ticker: &str) -> Option<&PositionSnapshot> {
        self.positions
            .iter()
            .find(|p| p.ticker.eq_ignore_ascii_case(ticker))
    }

    /// `cash + sum(shares * current_price)`, or `None` on overflow.
    #[must_use]
    pub fn expected_total_equity(&self) -> Option<Decimal> {
        self.positions
            .iter()
            .try_fold(self.cash, |acc, p| acc.checked_add(p.expected_value()?))
    }
}
