//! In-memory audit trail for tests and embedding.

use std::sync::Mutex;

use super::{AuditEntry, AuditError, AuditSink};

/// Keeps entries in a vector.
#[derive(Debug, Default)]
pub struct InMemoryAuditTrail {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditTrail {
    /// Create an empty trail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all entries in append order.
    #[must_use]
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether no run has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for InMemoryAuditTrail {
    fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .map_err(|_| AuditError::LockPoisoned)?
            .push(entry.clone());
        Ok(())
    }
}
