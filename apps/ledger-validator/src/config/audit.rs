//! Audit trail configuration.

use serde::{Deserialize, Serialize};

/// Where validation runs are recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// JSON Lines file, opened in append mode.
    #[serde(default = "default_audit_path")]
    pub path: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: default_audit_path(),
        }
    }
}

fn default_audit_path() -> String {
    "validation_audit.jsonl".to_string()
}
