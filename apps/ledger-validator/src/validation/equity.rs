//! Total-equity conservation across a before/after pair.
//!
//! Between two snapshots equity may only move by fees plus normal market
//! drift. The band is deliberately coarse: it catches a dropped position or a
//! double-counted trade, not a volatile session.

use rust_decimal::Decimal;

use super::overflow;
use crate::config::ToleranceConfig;
use crate::models::{FailureKind, Severity, ValidationOutcome};

/// Check name for the drift band.
pub const EQUITY_CONSERVATION: &str = "equity_conservation";
/// Check name for the large-move warning.
pub const EQUITY_CONTINUITY: &str = "equity_continuity";

/// Bounds unexplained equity change.
#[derive(Debug, Clone)]
pub struct EquityConservationChecker {
    drift: Decimal,
    continuity_warning: Decimal,
}

impl EquityConservationChecker {
    /// Create a checker with a drift band and continuity warning threshold.
    #[must_use]
    pub const fn new(drift: Decimal, continuity_warning: Decimal) -> Self {
        Self {
            drift,
            continuity_warning,
        }
    }

    /// Create a checker from tolerance configuration.
    #[must_use]
    pub const fn from_tolerances(tolerances: &ToleranceConfig) -> Self {
        Self::new(tolerances.equity_drift, tolerances.continuity_warning)
    }

    /// Passes iff `|(after - before) - (-fees)| <= before * drift`.
    #[must_use]
    pub fn check(
        &self,
        equity_before: Decimal,
        equity_after: Decimal,
        fees: Decimal,
    ) -> ValidationOutcome {
        let subject = ValidationOutcome::PORTFOLIO;
        let expected = Decimal::ZERO - fees;
        let (Some(actual), Some(band)) = (
            equity_after.checked_sub(equity_before),
            equity_before.checked_mul(self.drift),
        ) else {
            return overflow(EQUITY_CONSERVATION, subject);
        };
        let Some(unexplained) = actual.checked_add(fees).map(|d| d.abs()) else {
            return overflow(EQUITY_CONSERVATION, subject);
        };

        if unexplained <= band {
            ValidationOutcome::pass(
                EQUITY_CONSERVATION,
                subject,
                Severity::Error,
                format!("unexplained change {unexplained} within band {band}"),
            )
        } else {
            ValidationOutcome::fail(
                EQUITY_CONSERVATION,
                subject,
                FailureKind::EquityAnomaly,
                format!(
                    "equity {equity_before} -> {equity_after}: actual delta {actual}, expected {expected}; unexplained {unexplained} exceeds {band}"
                ),
            )
        }
    }

    /// Warn when equity moved by more than the continuity threshold.
    ///
    /// Returns `None` when there is no positive prior equity to compare with.
    /// A move too large to express as a ratio is an ERROR, not a warning.
    #[must_use]
    pub fn check_continuity(
        &self,
        equity_before: Decimal,
        equity_after: Decimal,
    ) -> Option<ValidationOutcome> {
        if equity_before <= Decimal::ZERO {
            return None;
        }

        let Some(change) = equity_after
            .checked_sub(equity_before)
            .and_then(|delta| delta.abs().checked_div(equity_before))
        else {
            return Some(overflow(EQUITY_CONTINUITY, ValidationOutcome::PORTFOLIO));
        };

        Some(if change > self.continuity_warning {
            ValidationOutcome::fail(
                EQUITY_CONTINUITY,
                ValidationOutcome::PORTFOLIO,
                FailureKind::DriftWarning,
                format!(
                    "equity {equity_before} -> {equity_after} moved {}; possible data error",
                    change.round_dp(4)
                ),
            )
        } else {
            ValidationOutcome::pass(
                EQUITY_CONTINUITY,
                ValidationOutcome::PORTFOLIO,
                Severity::Warning,
                format!("equity move {} within {}", change.round_dp(4), self.continuity_warning),
            )
        })
    }
}

impl Default for EquityConservationChecker {
    fn default() -> Self {
        Self::from_tolerances(&ToleranceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    #[test_case(dec!(100), dec!(95.1), dec!(0), true ; "drop within band")]
    #[test_case(dec!(100), dec!(95.0), dec!(0), true ; "drop at band edge")]
    #[test_case(dec!(100), dec!(94.9), dec!(0), false ; "drop just past band")]
    #[test_case(dec!(100), dec!(94.0), dec!(0), false ; "drop past band")]
    #[test_case(dec!(100), dec!(104.0), dec!(0), true ; "gain within band")]
    #[test_case(dec!(100), dec!(94.5), dec!(1.0), true ; "fees explain part")]
    fn test_conservation(before: Decimal, after: Decimal, fees: Decimal, passes: bool) {
        let outcome = EquityConservationChecker::default().check(before, after, fees);
        assert_eq!(outcome.passed, passes, "{}", outcome.detail);
        if !passes {
            assert_eq!(outcome.kind, Some(FailureKind::EquityAnomaly));
        }
    }

    #[test]
    fn test_failure_detail_carries_deltas() {
        let outcome = EquityConservationChecker::default().check(dec!(100), dec!(94.0), dec!(0));
        assert!(outcome.detail.contains("actual delta -6.0"));
        assert!(outcome.detail.contains("exceeds"));
    }

    #[test]
    fn test_continuity_warning() {
        let checker = EquityConservationChecker::default();

        let outcome = checker.check_continuity(dec!(100), dec!(40)).unwrap();
        assert!(outcome.is_warning());
        assert_eq!(outcome.kind, Some(FailureKind::DriftWarning));

        assert!(checker.check_continuity(dec!(100), dec!(120)).unwrap().passed);
        assert!(checker.check_continuity(Decimal::ZERO, dec!(120)).is_none());
    }

    #[test]
    fn test_oversized_equity_fails_without_panic() {
        let checker = EquityConservationChecker::default();

        let outcome = checker.check(Decimal::MIN, Decimal::MAX, Decimal::ZERO);
        assert!(outcome.is_blocking());
        assert_eq!(outcome.kind, Some(FailureKind::ArithmeticMismatch));

        let outcome = checker.check(dec!(100), Decimal::MAX, Decimal::MAX);
        assert!(outcome.is_blocking());

        let outcome = checker.check_continuity(dec!(0.0000001), Decimal::MAX).unwrap();
        assert!(outcome.is_blocking());
        assert!(outcome.detail.contains("overflow"));
    }
}
