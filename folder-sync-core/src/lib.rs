//! folder-sync core library: the sync configuration record, its defaults,
//! and the optional YAML config file.
//!
//! - [`types`] — [`SyncConfig`], [`CompareMode`], and the [`IntervalSecs`] newtype
//! - [`defaults`] — literal defaults shared by the launcher and `folder_sync`
//! - [`config`] — YAML config file load / merge
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod defaults;
pub mod error;
pub mod types;

pub use config::{ConfigFile, ConfigOverrides};
pub use error::ConfigError;
pub use types::{CompareMode, IntervalSecs, SyncConfig};
