//! Numeric tolerances for the integrity checks.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tolerances applied by every check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToleranceConfig {
    /// Absolute money tolerance for value, P&L, cash and share comparisons.
    #[serde(default = "default_absolute")]
    pub absolute: Decimal,
    /// Fractional widening of the recent range (0.20 = 20%).
    #[serde(default = "default_price_band")]
    pub price_band: Decimal,
    /// Allowed unexplained equity drift as a fraction of prior equity.
    #[serde(default = "default_equity_drift")]
    pub equity_drift: Decimal,
    /// Relative equity move that raises a continuity warning.
    #[serde(default = "default_continuity_warning")]
    pub continuity_warning: Decimal,
    /// Maximum single-position share of equity after a BUY.
    #[serde(default = "default_max_position_pct")]
    pub max_position_pct: Decimal,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            absolute: default_absolute(),
            price_band: default_price_band(),
            equity_drift: default_equity_drift(),
            continuity_warning: default_continuity_warning(),
            max_position_pct: default_max_position_pct(),
        }
    }
}

impl ToleranceConfig {
    /// Whether `actual` and `expected` agree within the absolute tolerance.
    ///
    /// A difference equal to the tolerance is a mismatch: one cent off on a
    /// cent-denominated ledger is a real error.
    #[must_use]
    pub fn within_absolute(&self, actual: Decimal, expected: Decimal) -> bool {
        crate::validation::within(actual, expected, self.absolute)
    }
}

const fn default_absolute() -> Decimal {
    Decimal::from_parts(1, 0, 0, false, 2)
}

const fn default_price_band() -> Decimal {
    Decimal::from_parts(20, 0, 0, false, 2)
}

const fn default_equity_drift() -> Decimal {
    Decimal::from_parts(5, 0, 0, false, 2)
}

const fn default_continuity_warning() -> Decimal {
    Decimal::from_parts(50, 0, 0, false, 2)
}

const fn default_max_position_pct() -> Decimal {
    Decimal::from_parts(35, 0, 0, false, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let tolerances = ToleranceConfig::default();
        assert_eq!(tolerances.absolute, dec!(0.01));
        assert_eq!(tolerances.price_band, dec!(0.20));
        assert_eq!(tolerances.equity_drift, dec!(0.05));
        assert_eq!(tolerances.continuity_warning, dec!(0.50));
        assert_eq!(tolerances.max_position_pct, dec!(0.35));
    }

    #[test]
    fn test_within_absolute() {
        let tolerances = ToleranceConfig::default();
        assert!(tolerances.within_absolute(dec!(34.625), dec!(34.62)));
        assert!(tolerances.within_absolute(dec!(-31.705), dec!(-31.70)));
        assert!(!tolerances.within_absolute(dec!(-31.71), dec!(-31.70)));
        assert!(!tolerances.within_absolute(dec!(35.12), dec!(34.62)));
    }
}
