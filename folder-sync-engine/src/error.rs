//! Error types for folder-sync-engine.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from a sync pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The source folder does not exist or is not a directory.
    #[error("source directory '{}' does not exist", path.display())]
    SourceMissing { path: PathBuf },

    /// One tree contains the other, so a pass would recurse into its own output.
    #[error(
        "source '{}' and destination '{}' must not contain each other",
        source_dir.display(),
        destination.display()
    )]
    NestedDestination {
        source_dir: PathBuf,
        destination: PathBuf,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
