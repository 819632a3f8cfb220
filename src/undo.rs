//! Single-level undo: one snapshot of pre-rewrite content per batch.
//!
//! The store never performs I/O itself. Restoring writes each entry back
//! through a [`ContentSink`] supplied by the surrounding tool, and the
//! surrounding tool owns persistence of the store between invocations.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Write collaborator used during restore.
pub trait ContentSink {
    fn write(&mut self, path: &str, content: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoEntry {
    pub path: String,
    pub original_content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoSnapshot {
    /// Epoch milliseconds at save time.
    pub timestamp_ms: u64,
    pub entries: Vec<UndoEntry>,
    pub summary: String,
}

/// Calling restore with no snapshot is the one hard failure signal.
#[derive(Debug, Error)]
#[error("no snapshot to restore")]
pub struct NoSnapshotError;

/// Outcome of a restore: per-entry failures are collected, not fatal.
#[derive(Debug)]
pub struct RestoreReport {
    pub restored: usize,
    /// (path, reason) for each entry that could not be written back.
    pub failures: Vec<(String, String)>,
}

/// The single-slot undo store. At most one snapshot exists at any time;
/// saving overwrites any prior snapshot. Concurrent batch operations must be
/// serialized by the caller.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UndoStore {
    snapshot: Option<UndoSnapshot>,
}

impl UndoStore {
    /// Save a snapshot, unconditionally replacing any existing one.
    pub fn save_snapshot(&mut self, entries: Vec<UndoEntry>, summary: String) {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        self.snapshot = Some(UndoSnapshot {
            timestamp_ms,
            entries,
            summary,
        });
    }

    pub fn can_restore(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn summary(&self) -> Option<&str> {
        self.snapshot.as_ref().map(|s| s.summary.as_str())
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
    }

    /// Write every entry's original content back through `sink`, best-effort.
    /// The snapshot is cleared even when some entries fail; inspect the
    /// report's `restored` count to detect partial failure.
    pub fn restore(&mut self, sink: &mut dyn ContentSink) -> Result<RestoreReport, NoSnapshotError> {
        let snapshot = self.snapshot.take().ok_or(NoSnapshotError)?;

        let mut report = RestoreReport {
            restored: 0,
            failures: Vec::new(),
        };
        for entry in snapshot.entries {
            match sink.write(&entry.path, &entry.original_content) {
                Ok(()) => report.restored += 1,
                Err(err) => report.failures.push((entry.path, err.to_string())),
            }
        }

        Ok(report)
    }
}
