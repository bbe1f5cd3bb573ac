//! Default values for every configuration field.
//!
//! These are the values the launcher passes when no override is given.

/// Program started by the launcher; resolved through `PATH`.
pub const PROGRAM: &str = "folder_sync";

pub const SOURCE_PATH: &str = "src/";
pub const DESTINATION_PATH: &str = "dst/";
pub const INTERVAL_SECONDS: u64 = 5;
pub const LOG_PATH: &str = "sync.log";
