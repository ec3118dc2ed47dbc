//! Recomputes position valuation and portfolio totals from primitives.

use rust_decimal::Decimal;

use super::{difference, overflow};
use crate::config::ToleranceConfig;
use crate::models::{FailureKind, PortfolioSnapshot, PositionSnapshot, Severity, ValidationOutcome};

/// Check name for `shares * current_price` vs reported value.
pub const POSITION_VALUE: &str = "position_value";
/// Check name for `reported value - cost_basis` vs reported P&L.
pub const POSITION_PNL: &str = "position_pnl";
/// Check name for the totals row market value.
pub const TOTAL_VALUE: &str = "total_value";
/// Check name for the totals row P&L.
pub const TOTAL_PNL: &str = "total_pnl";
/// Check name for the totals row equity.
pub const TOTAL_EQUITY: &str = "total_equity";

/// Validates the arithmetic inside one snapshot.
#[derive(Debug, Clone)]
pub struct PortfolioMathValidator {
    tolerance: Decimal,
}

impl PortfolioMathValidator {
    /// Create a validator with an absolute tolerance.
    #[must_use]
    pub const fn new(tolerance: Decimal) -> Self {
        Self { tolerance }
    }

    /// Create a validator from tolerance configuration.
    #[must_use]
    pub const fn from_tolerances(tolerances: &ToleranceConfig) -> Self {
        Self::new(tolerances.absolute)
    }

    /// Run every position and totals check. No check short-circuits another.
    ///
    /// The totals row is compared with the sum of the per-position rows, each
    /// of which is checked on its own; total equity is recomputed from cash
    /// and `shares * current_price`.
    #[must_use]
    pub fn check(&self, snapshot: &PortfolioSnapshot) -> Vec<ValidationOutcome> {
        let positions = snapshot.positions();
        let mut outcomes = Vec::with_capacity(positions.len() * 2 + 3);

        for position in positions {
            outcomes.push(self.check_value(position));
            outcomes.push(self.check_pnl(position));
        }

        let Some(totals) = snapshot.reported_totals() else {
            return outcomes;
        };

        if let Some(reported) = totals.total_value {
            let rows = checked_sum(positions.iter().map(PositionSnapshot::reported_total_value));
            outcomes.push(self.compare(TOTAL_VALUE, reported, rows));
        }
        if let Some(reported) = totals.total_pnl {
            let rows = checked_sum(positions.iter().map(PositionSnapshot::reported_pnl));
            outcomes.push(self.compare(TOTAL_PNL, reported, rows));
        }
        if let Some(reported) = totals.total_equity {
            outcomes.push(self.compare(TOTAL_EQUITY, reported, snapshot.expected_total_equity()));
        }

        outcomes
    }

    fn check_value(&self, position: &PositionSnapshot) -> ValidationOutcome {
        let ticker = position.ticker();
        let reported = position.reported_total_value();
        let Some(expected) = position.expected_value() else {
            return overflow(POSITION_VALUE, ticker);
        };

        match difference(reported, expected) {
            Some(diff) if diff < self.tolerance => ValidationOutcome::pass(
                POSITION_VALUE,
                ticker,
                Severity::Error,
                format!("value {reported} matches {} x {}", position.shares(), position.current_price()),
            ),
            Some(diff) => ValidationOutcome::fail(
                POSITION_VALUE,
                ticker,
                FailureKind::ArithmeticMismatch,
                format!(
                    "{ticker}: reported value {reported} != {} x {} = {expected} (off by {diff})",
                    position.shares(),
                    position.current_price(),
                ),
            ),
            None => overflow(POSITION_VALUE, ticker),
        }
    }

    fn check_pnl(&self, position: &PositionSnapshot) -> ValidationOutcome {
        let ticker = position.ticker();
        let reported = position.reported_pnl();
        let Some(expected) = position.expected_pnl() else {
            return overflow(POSITION_PNL, ticker);
        };

        match difference(reported, expected) {
            Some(diff) if diff < self.tolerance => ValidationOutcome::pass(
                POSITION_PNL,
                ticker,
                Severity::Error,
                format!("pnl {reported} matches"),
            ),
            Some(diff) => ValidationOutcome::fail(
                POSITION_PNL,
                ticker,
                FailureKind::ArithmeticMismatch,
                format!(
                    "{ticker}: reported pnl {reported} != {expected} (reported value {} - cost basis {}; off by {diff})",
                    position.reported_total_value(),
                    position.cost_basis(),
                ),
            ),
            None => overflow(POSITION_PNL, ticker),
        }
    }

    fn compare(
        &self,
        check_name: &str,
        reported: Decimal,
        expected: Option<Decimal>,
    ) -> ValidationOutcome {
        let subject = ValidationOutcome::PORTFOLIO;
        let Some(expected) = expected else {
            return overflow(check_name, subject);
        };

        match difference(reported, expected) {
            Some(diff) if diff < self.tolerance => ValidationOutcome::pass(
                check_name,
                subject,
                Severity::Error,
                format!("{check_name} {reported} matches"),
            ),
            Some(diff) => ValidationOutcome::fail(
                check_name,
                subject,
                FailureKind::ArithmeticMismatch,
                format!("reported {check_name} {reported} != recomputed {expected} (off by {diff})"),
            ),
            None => overflow(check_name, subject),
        }
    }
}

impl Default for PortfolioMathValidator {
    fn default() -> Self {
        Self::from_tolerances(&ToleranceConfig::default())
    }
}

fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}
