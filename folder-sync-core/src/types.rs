//! Domain types for a folder-sync configuration.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;
use std::num::NonZeroU64;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// IntervalSecs
// ---------------------------------------------------------------------------

/// Polling period in whole seconds. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct IntervalSecs(NonZeroU64);

impl IntervalSecs {
    pub fn new(seconds: u64) -> Result<Self, ConfigError> {
        NonZeroU64::new(seconds)
            .map(Self)
            .ok_or_else(|| ConfigError::InvalidInterval(seconds.to_string()))
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.0.get())
    }
}

impl Default for IntervalSecs {
    fn default() -> Self {
        Self(NonZeroU64::new(defaults::INTERVAL_SECONDS).unwrap_or(NonZeroU64::MIN))
    }
}

impl TryFrom<u64> for IntervalSecs {
    type Error = ConfigError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IntervalSecs> for u64 {
    fn from(value: IntervalSecs) -> Self {
        value.get()
    }
}

impl FromStr for IntervalSecs {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let seconds = s
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidInterval(s.to_owned()))?;
        Self::new(seconds)
    }
}

impl fmt::Display for IntervalSecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// CompareMode
// ---------------------------------------------------------------------------

/// How a pass decides whether a destination file is out of date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Copy when modification time or size differ.
    #[default]
    Mtime,
    /// Copy when SHA-256 content digests differ.
    Checksum,
}

impl FromStr for CompareMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mtime" => Ok(Self::Mtime),
            "checksum" => Ok(Self::Checksum),
            other => Err(format!(
                "unknown compare mode '{other}'; expected: mtime, checksum"
            )),
        }
    }
}

impl fmt::Display for CompareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mtime => f.write_str("mtime"),
            Self::Checksum => f.write_str("checksum"),
        }
    }
}

// ---------------------------------------------------------------------------
// SyncConfig
// ---------------------------------------------------------------------------

/// Fully-resolved settings for one `folder_sync` process.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    pub interval: IntervalSecs,
    pub log_path: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(defaults::SOURCE_PATH),
            destination_path: PathBuf::from(defaults::DESTINATION_PATH),
            interval: IntervalSecs::default(),
            log_path: PathBuf::from(defaults::LOG_PATH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_literal_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.source_path, PathBuf::from("src/"));
        assert_eq!(config.destination_path, PathBuf::from("dst/"));
        assert_eq!(config.interval.get(), 5);
        assert_eq!(config.log_path, PathBuf::from("sync.log"));
    }

    #[test]
    fn interval_rejects_zero() {
        assert!(matches!(
            IntervalSecs::new(0),
            Err(ConfigError::InvalidInterval(_))
        ));
        assert!("0".parse::<IntervalSecs>().is_err());
    }

    #[test]
    fn interval_parses_and_converts_to_duration() {
        let interval: IntervalSecs = " 30 ".parse().expect("parse");
        assert_eq!(interval.as_duration(), Duration::from_secs(30));
        assert_eq!(interval.to_string(), "30");
    }

    #[test]
    fn compare_mode_parses_case_insensitively() {
        assert_eq!("Checksum".parse::<CompareMode>(), Ok(CompareMode::Checksum));
        assert_eq!("mtime".parse::<CompareMode>(), Ok(CompareMode::Mtime));
        assert!("size".parse::<CompareMode>().is_err());
    }

    #[test]
    fn interval_rejects_non_numeric() {
        let err = "soon".parse::<IntervalSecs>().unwrap_err();
        assert!(err.to_string().contains("soon"));
    }
}
