//! Optional YAML config file and layered resolution.
//!
//! # File format
//!
//! ```yaml
//! source: /srv/photos
//! destination: /mnt/backup/photos
//! interval_seconds: 60
//! log_file: /var/log/folder_sync.log
//! prune: false
//! compare: mtime   # or: checksum
//! ```
//!
//! Every key is optional. Resolution order for each setting:
//! command-line override, then config file, then [`crate::defaults`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{CompareMode, IntervalSecs, SyncConfig};

/// On-disk config file payload. All keys optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prune: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare: Option<CompareMode>,
}

/// Values supplied on the command line; `None` means "not given".
///
/// The interval is kept raw so that a zero from the command line is reported
/// as a configuration error, the same way as a zero in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub interval_seconds: Option<u64>,
    pub log_file: Option<PathBuf>,
}

/// Load a config file from `path`.
pub fn load_at(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(path, &contents)
}

fn parse(path: &Path, contents: &str) -> Result<ConfigFile, ConfigError> {
    // An empty document deserializes as unit, not as an empty map.
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge overrides, an optional config file, and built-in defaults.
pub fn resolve(
    file: Option<&ConfigFile>,
    overrides: ConfigOverrides,
) -> Result<SyncConfig, ConfigError> {
    let defaults = SyncConfig::default();
    let file = file.cloned().unwrap_or_default();

    let interval = match overrides.interval_seconds.or(file.interval_seconds) {
        Some(seconds) => IntervalSecs::new(seconds)?,
        None => defaults.interval,
    };

    Ok(SyncConfig {
        source_path: overrides
            .source
            .or(file.source)
            .unwrap_or(defaults.source_path),
        destination_path: overrides
            .destination
            .or(file.destination)
            .unwrap_or(defaults.destination_path),
        interval,
        log_path: overrides
            .log_file
            .or(file.log_file)
            .unwrap_or(defaults.log_path),
    })
}
