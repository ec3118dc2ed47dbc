//! Validation metrics.
//!
//! Recorded through the `metrics` facade; the library installs no exporter,
//! so these are no-ops until the host process installs a recorder.

use metrics::{counter, histogram};

/// Record one completed validation run.
///
/// # Arguments
///
/// * `run_kind` - `snapshot` or `pre_trade`
/// * `passed` - Report verdict
/// * `duration_seconds` - Wall time of the run
pub fn record_validation_run(run_kind: &str, passed: bool, duration_seconds: f64) {
    let verdict = if passed { "pass" } else { "fail" };

    counter!(
        "ledger_validation_runs_total",
        "run_kind" => run_kind.to_string(),
        "verdict" => verdict
    )
    .increment(1);

    histogram!(
        "ledger_validation_duration_seconds",
        "run_kind" => run_kind.to_string()
    )
    .record(duration_seconds);
}

/// Record a failing check.
///
/// # Arguments
///
/// * `check_name` - Check identifier (e.g., `position_value`)
/// * `severity` - `ERROR` or `WARNING`
pub fn record_failed_check(check_name: &str, severity: &str) {
    counter!(
        "ledger_validation_failed_checks_total",
        "check" => check_name.to_string(),
        "severity" => severity.to_string()
    )
    .increment(1);
}

/// Record an audit trail write failure.
pub fn record_audit_failure() {
    counter!("ledger_audit_write_failures_total").increment(1);
}
