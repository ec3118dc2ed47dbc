//! Observability for validation runs.

mod metrics;

pub use metrics::{record_audit_failure, record_failed_check, record_validation_run};
