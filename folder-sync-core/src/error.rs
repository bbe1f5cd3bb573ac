//! Error types for folder-sync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while building a [`crate::SyncConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure reading the config file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The polling interval must be a positive number of seconds.
    #[error("invalid interval '{0}': must be a positive number of seconds")]
    InvalidInterval(String),
}
