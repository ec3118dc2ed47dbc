//! Post-execution checks on a trade's effect on cash and holdings.

use rust_decimal::Decimal;

use super::{overflow, within};
use crate::config::ToleranceConfig;
use crate::models::{FailureKind, Severity, TradeRecord, ValidationOutcome};

/// Check name for the cash delta.
pub const CASH_FLOW: &str = "cash_flow";
/// Check name for the held-share delta.
pub const SHARE_DELTA: &str = "share_delta";

/// Verifies that a trade moved cash and shares by what its economics imply.
#[derive(Debug, Clone)]
pub struct TradeExecutionValidator {
    tolerance: Decimal,
}

impl TradeExecutionValidator {
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

    /// Compare the observed cash delta with the trade's expected delta.
    #[must_use]
    pub fn check(
        &self,
        trade: &TradeRecord,
        cash_before: Decimal,
        cash_after: Decimal,
    ) -> ValidationOutcome {
        let ticker = trade.ticker();
        let (Some(expected), Some(observed)) =
            (trade.expected_cash_delta(), cash_after.checked_sub(cash_before))
        else {
            return overflow(CASH_FLOW, ticker);
        };

        if within(observed, expected, self.tolerance) {
            ValidationOutcome::pass(
                CASH_FLOW,
                ticker,
                Severity::Error,
                format!("{} cash delta {observed} matches {expected}", trade.action()),
            )
        } else {
            ValidationOutcome::fail(
                CASH_FLOW,
                ticker,
                FailureKind::CashFlowMismatch,
                format!(
                    "{} {} {ticker} @ {} (fee {}): expected cash delta {expected}, observed {observed} ({cash_before} -> {cash_after})",
                    trade.action(),
                    trade.shares(),
                    trade.price(),
                    trade.fee()
                ),
            )
        }
    }

    /// Compare the observed change in held shares with the trade size.
    #[must_use]
    pub fn check_share_delta(
        &self,
        trade: &TradeRecord,
        shares_before: Decimal,
        shares_after: Decimal,
    ) -> ValidationOutcome {
        let ticker = trade.ticker();
        let expected = trade.expected_share_delta();
        let Some(observed) = shares_after.checked_sub(shares_before) else {
            return overflow(SHARE_DELTA, ticker);
        };

        if within(observed, expected, self.tolerance) {
            ValidationOutcome::pass(
                SHARE_DELTA,
                ticker,
                Severity::Error,
                format!("share delta {observed} matches"),
            )
        } else {
            ValidationOutcome::fail(
                SHARE_DELTA,
                ticker,
                FailureKind::ArithmeticMismatch,
                format!(
                    "{} {} {ticker}: expected share delta {expected}, observed {observed} ({shares_before} -> {shares_after})",
                    trade.action(),
                    trade.shares()
                ),
            )
        }
    }
}

impl Default for TradeExecutionValidator {
    fn default() -> Self {
        Self::from_tolerances(&ToleranceConfig::default())
    }
}
