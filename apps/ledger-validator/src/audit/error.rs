//! Audit trail errors.

use thiserror::Error;

/// Errors from writing or reading the audit trail.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The trail file could not be opened.
    #[error("Failed to open audit trail '{path}': {source}")]
    Open {
        /// Trail path.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Writing or flushing an entry failed.
    #[error("Failed to write audit entry: {0}")]
    Io(#[from] std::io::Error),

    /// The entry could not be encoded.
    #[error("Failed to serialize audit entry: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored line is not a valid entry.
    #[error("Malformed audit entry at line {line}: {source}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// The underlying decode error.
        source: serde_json::Error,
    },

    /// A writer panicked while holding the trail lock.
    #[error("Audit trail lock poisoned")]
    LockPoisoned,
}
