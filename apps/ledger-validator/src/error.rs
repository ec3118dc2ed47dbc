//! Crate-level error type.

use thiserror::Error;

use crate::audit::AuditError;

/// Errors that stop a validation run from being recorded.
///
/// A FAIL verdict is not an error; it is returned in the report. Malformed
/// inputs are rejected earlier, when the models are constructed.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// The run could not be recorded. Treat as "do not persist".
    #[error("Audit trail unavailable: {0}")]
    Audit(#[from] AuditError),
}
