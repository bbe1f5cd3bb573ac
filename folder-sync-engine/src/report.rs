//! Per-pass outcome reporting.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome for a single destination path during a pass.
///
/// Paths are relative to the destination root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SyncAction {
    /// Destination directory was created.
    CreatedDir { path: PathBuf },
    /// `dry_run`: the directory *would* have been created.
    WouldCreateDir { path: PathBuf },
    /// File was copied (missing or out of date at the destination).
    Copied { path: PathBuf },
    /// `dry_run`: the file *would* have been copied.
    WouldCopy { path: PathBuf },
    /// File already up to date.
    Unchanged { path: PathBuf },
    /// Extraneous destination entry was removed (prune).
    Removed { path: PathBuf },
    /// `dry_run`: the entry *would* have been removed.
    WouldRemove { path: PathBuf },
    /// Entry skipped (e.g. symlinked directory).
    Skipped { path: PathBuf, reason: String },
    /// Entry could not be read, written or removed; the pass went on without it.
    Failed { path: PathBuf, error: String },
}

impl SyncAction {
    pub fn path(&self) -> &PathBuf {
        match self {
            SyncAction::CreatedDir { path }
            | SyncAction::WouldCreateDir { path }
            | SyncAction::Copied { path }
            | SyncAction::WouldCopy { path }
            | SyncAction::Unchanged { path }
            | SyncAction::Removed { path }
            | SyncAction::WouldRemove { path }
            | SyncAction::Skipped { path, .. }
            | SyncAction::Failed { path, .. } => path,
        }
    }
}

/// Summary of one completed pass.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub actions: Vec<SyncAction>,
}

impl SyncReport {
    /// Files copied, or that would be copied in dry-run mode.
    pub fn copied(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::Copied { .. } | SyncAction::WouldCopy { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::Unchanged { .. }))
    }

    pub fn created_dirs(&self) -> usize {
        self.count(|a| {
            matches!(
                a,
                SyncAction::CreatedDir { .. } | SyncAction::WouldCreateDir { .. }
            )
        })
    }

    pub fn removed(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::Removed { .. } | SyncAction::WouldRemove { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::Failed { .. }))
    }

    /// True when the pass changed (or would change) nothing and hit no errors.
    pub fn is_noop(&self) -> bool {
        self.copied() == 0 && self.created_dirs() == 0 && self.removed() == 0 && self.failed() == 0
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    fn count(&self, pred: impl Fn(&SyncAction) -> bool) -> usize {
        self.actions.iter().filter(|a| pred(a)).count()
    }
}
