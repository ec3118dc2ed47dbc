//! JSON Lines audit trail on disk.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{AuditEntry, AuditError, AuditSink};

/// File-backed trail: one JSON object per line, opened in append mode.
#[derive(Debug)]
pub struct JsonlAuditTrail {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonlAuditTrail {
    /// Open (or create) the trail at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref();
        let open_err = |source| AuditError::Open {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(open_err)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(open_err)?;

        tracing::debug!(path = %path.display(), "Opened audit trail");

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Trail location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonlAuditTrail {
    fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let line = serde_json::to_string(entry)?;

        let mut writer = self.writer.lock().map_err(|_| AuditError::LockPoisoned)?;
        writeln!(writer, "{line}")?;
        writer.flush()?;

        Ok(())
    }
}

impl Drop for JsonlAuditTrail {
    fn drop(&mut self) {
        let writer = match self.writer.get_mut() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writer.flush() {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to flush audit trail on drop");
        }
    }
}

/// Read every entry in a trail, in file order.
///
/// Blank lines are skipped; any other undecodable line is an error.
pub fn read_audit_trail(path: impl AsRef<Path>) -> Result<Vec<AuditEntry>, AuditError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AuditError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let mut entries = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = serde_json::from_str(&line).map_err(|source| AuditError::Malformed {
            line: idx + 1,
            source,
        })?;
        entries.push(entry);
    }

    Ok(entries)
}
