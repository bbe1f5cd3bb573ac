//! Argument-vector construction and the single child launch.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use folder_sync_core::defaults;

use crate::error::LaunchError;

/// Exit code used when the program could not be started at all
/// (shell convention for "command not found").
pub const LAUNCH_FAILURE_EXIT_CODE: i32 = 127;

// ---------------------------------------------------------------------------
// Flag mapping
// ---------------------------------------------------------------------------

/// Flag names for each logical option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagMapping {
    pub source: &'static str,
    pub destination: &'static str,
    pub interval: &'static str,
    pub log_file: &'static str,
}

impl FlagMapping {
    /// `--src / --dst / --interval / --logfile`
    pub const STANDARD: Self = Self {
        source: "--src",
        destination: "--dst",
        interval: "--interval",
        log_file: "--logfile",
    };

    /// `--src / --dst / --period / --log`, the older `folder_sync` contract.
    pub const LEGACY: Self = Self {
        source: "--src",
        destination: "--dst",
        interval: "--period",
        log_file: "--log",
    };
}

impl Default for FlagMapping {
    fn default() -> Self {
        Self::STANDARD
    }
}

// ---------------------------------------------------------------------------
// LaunchConfig
// ---------------------------------------------------------------------------

/// Everything needed to start `folder_sync` once.
///
/// Values are passed through untouched: the launcher never checks that the
/// paths exist or that the interval is positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub program: OsString,
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    pub interval_seconds: u64,
    pub log_path: PathBuf,
    pub flags: FlagMapping,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            program: OsString::from(defaults::PROGRAM),
            source_path: PathBuf::from(defaults::SOURCE_PATH),
            destination_path: PathBuf::from(defaults::DESTINATION_PATH),
            interval_seconds: defaults::INTERVAL_SECONDS,
            log_path: PathBuf::from(defaults::LOG_PATH),
            flags: FlagMapping::default(),
        }
    }
}

impl LaunchConfig {
    /// The argument vector passed to the program, one element per flag or value.
    pub fn args(&self) -> Vec<OsString> {
        vec![
            self.flags.source.into(),
            self.source_path.clone().into_os_string(),
            self.flags.destination.into(),
            self.destination_path.clone().into_os_string(),
            self.flags.interval.into(),
            self.interval_seconds.to_string().into(),
            self.flags.log_file.into(),
            self.log_path.clone().into_os_string(),
        ]
    }

    /// A ready-to-spawn command with inherited environment and stdio.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(self.args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        command
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// How the child finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Exited with status 0.
    Succeeded,
    /// Exited non-zero, or was killed by `signal` (Unix).
    ChildFailed { code: i32, signal: Option<i32> },
}

impl LaunchOutcome {
    pub fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            return Self::Succeeded;
        }
        match status.code() {
            Some(code) => Self::ChildFailed { code, signal: None },
            None => {
                let signal = terminating_signal(status);
                Self::ChildFailed {
                    code: signal.map(|s| 128 + s).unwrap_or(1),
                    signal,
                }
            }
        }
    }

    /// The exit code the launcher should report; the child's own code verbatim.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Succeeded => 0,
            Self::ChildFailed { code, .. } => *code,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

#[cfg(unix)]
fn terminating_signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn terminating_signal(_status: ExitStatus) -> Option<i32> {
    None
}

// ---------------------------------------------------------------------------
// launch
// ---------------------------------------------------------------------------

/// Start the program once and block until it exits.
///
/// No retries, no timeout, no output capture.
pub fn launch(config: &LaunchConfig) -> Result<LaunchOutcome, LaunchError> {
    let launch_failure = |source: std::io::Error| LaunchError::LaunchFailure {
        program: config.program.clone(),
        source,
    };

    tracing::debug!(
        program = %config.program.to_string_lossy(),
        args = ?config.args(),
        "launching folder sync",
    );
    let mut child = config.command().spawn().map_err(launch_failure)?;
    let status = child.wait().map_err(launch_failure)?;

    let outcome = LaunchOutcome::from_status(status);
    if let LaunchOutcome::ChildFailed { code, signal } = outcome {
        tracing::warn!(code, signal = ?signal, "folder sync exited with failure");
    }
    Ok(outcome)
}
