//! Result of a single integrity check.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How much a failing check matters to the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Surfaced, never flips the verdict.
    Warning,
    /// A failing ERROR makes the whole report FAIL.
    Error,
}

impl Severity {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Reference data (range, quote) was missing or did not match.
    DataUnavailable,
    /// Recomputed value or P&L disagrees with the reported one.
    ArithmeticMismatch,
    /// Observed cash delta disagrees with the trade's economics.
    CashFlowMismatch,
    /// Equity moved by more than fees explain.
    EquityAnomaly,
    /// A pre-trade condition does not hold.
    PreconditionViolation,
    /// Quote lies outside the widened recent range.
    PriceOutOfBand,
    /// Soft drift signal (close deviation, equity jump).
    DriftWarning,
}

impl FailureKind {
    /// Severity a failure of this kind carries.
    #[must_use]
    pub const fn default_severity(self) -> Severity {
        match self {
            Self::DataUnavailable | Self::DriftWarning => Severity::Warning,
            Self::ArithmeticMismatch
            | Self::CashFlowMismatch
            | Self::EquityAnomaly
            | Self::PreconditionViolation
            | Self::PriceOutOfBand => Severity::Error,
        }
    }

    /// Machine-readable reason string.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::DataUnavailable => "DATA_UNAVAILABLE",
            Self::ArithmeticMismatch => "ARITHMETIC_MISMATCH",
            Self::CashFlowMismatch => "CASH_FLOW_MISMATCH",
            Self::EquityAnomaly => "EQUITY_ANOMALY",
            Self::PreconditionViolation => "PRECONDITION_VIOLATION",
            Self::PriceOutOfBand => "PRICE_OUT_OF_BAND",
            Self::DriftWarning => "DRIFT_WARNING",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Outcome of one check against one subject (a ticker or `portfolio`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Stable check identifier, e.g. `position_value`.
    pub check_name: String,
    /// Ticker or `portfolio`.
    pub subject: String,
    /// Whether the check held.
    pub passed: bool,
    /// Severity if the check failed.
    pub severity: Severity,
    /// Failure category; `None` when passed.
    #[serde(default)]
    pub kind: Option<FailureKind>,
    /// Human-readable explanation.
    pub detail: String,
}

impl ValidationOutcome {
    /// Subject used for whole-portfolio checks.
    pub const PORTFOLIO: &'static str = "portfolio";

    /// A passing outcome.
    pub fn pass(
        check_name: impl Into<String>,
        subject: impl Into<String>,
        severity: Severity,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            check_name: check_name.into(),
            subject: subject.into(),
            passed: true,
            severity,
            kind: None,
            detail: detail.into(),
        }
    }

    /// A failing outcome at the kind's default severity.
    pub fn fail(
        check_name: impl Into<String>,
        subject: impl Into<String>,
        kind: FailureKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            check_name: check_name.into(),
            subject: subject.into(),
            passed: false,
            severity: kind.default_severity(),
            kind: Some(kind),
            detail: detail.into(),
        }
    }

    /// Failed with ERROR severity.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        !self.passed && self.severity == Severity::Error
    }

    /// Failed with WARNING severity.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        !self.passed && self.severity == Severity::Warning
    }
}
