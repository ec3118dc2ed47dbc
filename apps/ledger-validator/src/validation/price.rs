//! Quote plausibility against recent trading ranges.

use rust_decimal::Decimal;

use super::{difference, overflow};
use crate::config::ToleranceConfig;
use crate::models::{FailureKind, InstrumentQuote, RecentRange, Severity, ValidationOutcome};

/// Check name for the range-band test.
pub const PRICE_BAND: &str = "price_band";
/// Check name for the close-deviation warning.
pub const PRICE_CLOSE_DEVIATION: &str = "price_close_deviation";

/// Judges whether a quoted price is plausible.
#[derive(Debug, Clone)]
pub struct PriceSanityChecker {
    band: Decimal,
}

impl PriceSanityChecker {
    /// Create a checker with the given band (0.20 widens the range by 20% each side).
    #[must_use]
    pub const fn new(band: Decimal) -> Self {
        Self { band }
    }

    /// Create a checker from tolerance configuration.
    #[must_use]
    pub const fn from_tolerances(tolerances: &ToleranceConfig) -> Self {
        Self::new(tolerances.price_band)
    }

    /// Check `quote` against `range`.
    ///
    /// Passes iff `low * (1 - band) <= price <= high * (1 + band)`. A missing
    /// range, or one for another ticker, is a DataUnavailable warning.
    #[must_use]
    pub fn check(&self, quote: &InstrumentQuote, range: Option<&RecentRange>) -> ValidationOutcome {
        let ticker = quote.ticker();

        let Some(range) = range else {
            return ValidationOutcome::fail(
                PRICE_BAND,
                ticker,
                FailureKind::DataUnavailable,
                format!("no recent range for {ticker}; price {} unverified", quote.price()),
            );
        };

        if !range.ticker().eq_ignore_ascii_case(ticker) {
            return ValidationOutcome::fail(
                PRICE_BAND,
                ticker,
                FailureKind::DataUnavailable,
                format!(
                    "range supplied for {} cannot verify {ticker}; price {} unverified",
                    range.ticker(),
                    quote.price()
                ),
            );
        }

        let (Some(lower), Some(upper)) = (
            Decimal::ONE
                .checked_sub(self.band)
                .and_then(|factor| range.low().checked_mul(factor)),
            Decimal::ONE
                .checked_add(self.band)
                .and_then(|factor| range.high().checked_mul(factor)),
        ) else {
            return overflow(PRICE_BAND, ticker);
        };
        let price = quote.price();

        if price >= lower && price <= upper {
            ValidationOutcome::pass(
                PRICE_BAND,
                ticker,
                Severity::Error,
                format!("price {price} within [{lower}, {upper}]"),
            )
        } else {
            ValidationOutcome::fail(
                PRICE_BAND,
                ticker,
                FailureKind::PriceOutOfBand,
                format!(
                    "price {price} outside [{lower}, {upper}] ({}-day range {}..{}, band {})",
                    range.window_days(),
                    range.low(),
                    range.high(),
                    self.band
                ),
            )
        }
    }

    /// Compare `quote` with the range's last close.
    ///
    /// Returns `None` when the range has no positive close to compare with.
    #[must_use]
    pub fn check_close_deviation(
        &self,
        quote: &InstrumentQuote,
        range: &RecentRange,
    ) -> Option<ValidationOutcome> {
        let close = range.last_close().filter(|c| *c > Decimal::ZERO)?;
        let ticker = quote.ticker();
        let Some(deviation) =
            difference(quote.price(), close).and_then(|diff| diff.checked_div(close))
        else {
            return Some(overflow(PRICE_CLOSE_DEVIATION, ticker));
        };

        Some(if deviation > self.band {
            ValidationOutcome::fail(
                PRICE_CLOSE_DEVIATION,
                ticker,
                FailureKind::DriftWarning,
                format!(
                    "price {} deviates {} from last close {close}",
                    quote.price(),
                    deviation.round_dp(4)
                ),
            )
        } else {
            ValidationOutcome::pass(
                PRICE_CLOSE_DEVIATION,
                ticker,
                Severity::Warning,
                format!("price within {} of last close {close}", self.band),
            )
        })
    }
}

impl Default for PriceSanityChecker {
    fn default() -> Self {
        Self::from_tolerances(&ToleranceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    fn quote(price: Decimal) -> InstrumentQuote {
        InstrumentQuote::new("ABEO", price, Utc::now()).unwrap()
    }

    fn range() -> RecentRange {
        RecentRange::new("ABEO", dec!(5.00), dec!(10.00), 5).unwrap()
    }

    #[test_case(dec!(5.00), true ; "at range low")]
    #[test_case(dec!(10.00), true ; "at range high")]
    #[test_case(dec!(4.00), true ; "at widened low")]
    #[test_case(dec!(12.00), true ; "at widened high")]
    #[test_case(dec!(3.95), false ; "low times 0.79")]
    #[test_case(dec!(12.10), false ; "high times 1.21")]
    #[test_case(dec!(0), false ; "stale zero")]
    fn test_band_boundaries(price: Decimal, passes: bool) {
        let outcome = PriceSanityChecker::default().check(&quote(price), Some(&range()));

        assert_eq!(outcome.passed, passes);
        assert_eq!(outcome.severity, Severity::Error);
        if !passes {
            assert_eq!(outcome.kind, Some(FailureKind::PriceOutOfBand));
        }
    }

    #[test]
    fn test_missing_range_is_warning() {
        let outcome = PriceSanityChecker::default().check(&quote(dec!(5.77)), None);

        assert!(!outcome.passed);
        assert_eq!(outcome.severity, Severity::Warning);
        assert_eq!(outcome.kind, Some(FailureKind::DataUnavailable));
        assert!(!outcome.is_blocking());
    }

    #[test]
    fn test_mismatched_range_is_warning() {
        let other = RecentRange::new("MSFT", dec!(400), dec!(420), 5).unwrap();
        let outcome = PriceSanityChecker::default().check(&quote(dec!(5.77)), Some(&other));

        assert_eq!(outcome.kind, Some(FailureKind::DataUnavailable));
        assert!(outcome.detail.contains("MSFT"));
    }

    #[test]
    fn test_close_deviation() {
        let checker = PriceSanityChecker::default();
        let range = range().with_last_close(dec!(6.00)).unwrap();

        let near = checker.check_close_deviation(&quote(dec!(6.50)), &range).unwrap();
        assert!(near.passed);

        let far = checker.check_close_deviation(&quote(dec!(7.50)), &range).unwrap();
        assert!(far.is_warning());
        assert_eq!(far.kind, Some(FailureKind::DriftWarning));
    }

    #[test]
    fn test_close_deviation_skipped_without_close() {
        let checker = PriceSanityChecker::default();
        assert!(checker.check_close_deviation(&quote(dec!(6.50)), &range()).is_none());

        let zero_close = range().with_last_close(Decimal::ZERO).unwrap();
        assert!(
            checker
                .check_close_deviation(&quote(dec!(6.50)), &zero_close)
                .is_none()
        );
    }

    #[test]
    fn test_oversized_range_fails_without_panic() {
        let checker = PriceSanityChecker::default();
        let huge = RecentRange::new("ABEO", dec!(5.00), Decimal::MAX, 5)
            .unwrap()
            .with_last_close(dec!(0.0000000001))
            .unwrap();

        let outcome = checker.check(&quote(Decimal::MAX), Some(&huge));
        assert!(outcome.is_blocking());
        assert_eq!(outcome.kind, Some(FailureKind::ArithmeticMismatch));

        let outcome = checker.check_close_deviation(&quote(Decimal::MAX), &huge).unwrap();
        assert!(outcome.is_blocking());
        assert!(outcome.detail.contains("overflow"));
    }
}
