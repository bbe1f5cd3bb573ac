use std::ffi::OsString;

use thiserror::Error;

/// Failures of the launcher itself. A child that runs and exits non-zero is
/// not an error; see [`crate::LaunchOutcome::ChildFailed`].
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The program is missing, not executable, or the OS refused to start
    /// (or wait on) it.
    #[error("failed to launch {}: {source}", program.to_string_lossy())]
    LaunchFailure {
        program: OsString,
        #[source]
        source: std::io::Error,
    },
}
