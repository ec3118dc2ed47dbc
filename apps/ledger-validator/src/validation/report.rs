//! Aggregated verdict for one validation run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::ValidationOutcome;

/// What a run validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    /// Snapshot (plus optional trade/equity context) after the fact.
    Snapshot,
    /// Preconditions for a proposed trade.
    PreTrade,
}

impl RunKind {
    /// Label used in logs, metrics, and the audit trail.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::PreTrade => "pre_trade",
        }
    }
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a validation run.
///
/// `passed` is derived from the outcomes at construction and the report is
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    run_id: Uuid,
    run_kind: RunKind,
    passed: bool,
    outcomes: Vec<ValidationOutcome>,
    completed_at: DateTime<Utc>,
    duration_ms: u64,
}

impl ValidationReport {
    /// Build a report; the verdict is FAIL iff any ERROR outcome failed.
    #[must_use]
    pub fn new(
        run_id: Uuid,
        run_kind: RunKind,
        outcomes: Vec<ValidationOutcome>,
        completed_at: DateTime<Utc>,
        duration_ms: u64,
    ) -> Self {
        let passed = !outcomes.iter().any(ValidationOutcome::is_blocking);
        Self {
            run_id,
            run_kind,
            passed,
            outcomes,
            completed_at,
            duration_ms,
        }
    }

    /// Unique ID of this run.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// What the run validated.
    #[must_use]
    pub const fn run_kind(&self) -> RunKind {
        self.run_kind
    }

    /// Overall verdict.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.passed
    }

    /// Outcomes in the order the checks ran.
    #[must_use]
    pub fn outcomes(&self) -> &[ValidationOutcome] {
        &self.outcomes
    }

    /// Completion timestamp.
    #[must_use]
    pub const fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Run duration in milliseconds.
    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Failed ERROR outcomes.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationOutcome> {
        self.outcomes.iter().filter(|o| o.is_blocking())
    }

    /// Failed WARNING outcomes.
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationOutcome> {
        self.outcomes.iter().filter(|o| o.is_warning())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FailureKind, Severity};

    fn report(outcomes: Vec<ValidationOutcome>) -> ValidationReport {
        ValidationReport::new(Uuid::new_v4(), RunKind::Snapshot, outcomes, Utc::now(), 3)
    }

    #[test]
    fn test_empty_report_passes() {
        assert!(report(vec![]).passed());
    }

    #[test]
    fn test_warning_does_not_flip_verdict() {
        let report = report(vec![
            ValidationOutcome::pass("position_value", "ABEO", Severity::Error, "ok"),
            ValidationOutcome::fail("price_band", "ABEO", FailureKind::DataUnavailable, "no range"),
        ]);

        assert!(report.passed());
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(report.errors().count(), 0);
    }

    #[test]
    fn test_error_fails_report() {
        let report = report(vec![
            ValidationOutcome::fail("price_band", "ABEO", FailureKind::DataUnavailable, "no range"),
            ValidationOutcome::fail("cash_flow", "ABEO", FailureKind::CashFlowMismatch, "off"),
        ]);

        assert!(!report.passed());
        assert_eq!(report.errors().count(), 1);
    }

    #[test]
    fn test_run_kind_labels() {
        assert_eq!(RunKind::Snapshot.to_string(), "snapshot");
        assert_eq!(
            serde_json::to_value(RunKind::PreTrade).unwrap(),
            serde_json::json!("pre_trade")
        );
    }
}
