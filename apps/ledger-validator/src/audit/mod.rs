//! Append-only record of every validation run.
//!
//! Each run, pass or fail, becomes one [`AuditEntry`]. Sinks only ever append;
//! nothing in this crate rewrites or truncates a stored entry.

mod error;
mod jsonl;
mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ValidationOutcome;
use crate::validation::{RunKind, ValidationReport};

pub use error::AuditError;
pub use jsonl::{JsonlAuditTrail, read_audit_trail};
pub use memory::InMemoryAuditTrail;

/// One audited run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Run ID, shared with the report.
    pub run_id: Uuid,
    /// When the run completed.
    pub recorded_at: DateTime<Utc>,
    /// What the run validated.
    pub run_kind: RunKind,
    /// Verdict.
    pub passed: bool,
    /// Run duration in milliseconds.
    pub duration_ms: u64,
    /// Full outcome list in check order.
    pub outcomes: Vec<ValidationOutcome>,
}

impl From<&ValidationReport> for AuditEntry {
    fn from(report: &ValidationReport) -> Self {
        Self {
            run_id: report.run_id(),
            recorded_at: report.completed_at(),
            run_kind: report.run_kind(),
            passed: report.passed(),
            duration_ms: report.duration_ms(),
            outcomes: report.outcomes().to_vec(),
        }
    }
}

/// Destination for audit entries.
///
/// Implementations serialize concurrent appends and make each entry durable
/// before returning.
pub trait AuditSink: Send + Sync {
    /// Append one entry.
    fn append(&self, entry: &AuditEntry) -> Result<(), AuditError>;
}

impl<S: AuditSink + ?Sized> AuditSink for &S {
    fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        (**self).append(entry)
    }
}

impl<S: AuditSink + ?Sized> AuditSink for std::sync::Arc<S> {
    fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        (**self).append(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FailureKind, Severity};

    #[test]
    fn test_entry_from_report() {
        let report = ValidationReport::new(
            Uuid::new_v4(),
            RunKind::Snapshot,
            vec![
                ValidationOutcome::pass("position_value", "ABEO", Severity::Error, "ok"),
                ValidationOutcome::fail("total_equity", "portfolio", FailureKind::ArithmeticMismatch, "off"),
            ],
            Utc::now(),
            4,
        );

        let entry = AuditEntry::from(&report);

        assert_eq!(entry.run_id, report.run_id());
        assert!(!entry.passed);
        assert_eq!(entry.outcomes, report.outcomes());
        assert_eq!(entry.duration_ms, 4);
    }

    #[test]
    fn test_entry_wire_fields() {
        let report = ValidationReport::new(Uuid::new_v4(), RunKind::PreTrade, vec![], Utc::now(), 1);
        let json = serde_json::to_value(AuditEntry::from(&report)).unwrap();

        for field in ["run_id", "recorded_at", "run_kind", "passed", "duration_ms", "outcomes"] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
        assert_eq!(json["run_kind"], "pre_trade");
    }
}
