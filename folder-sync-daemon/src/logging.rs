//! Tracing setup: every event is appended to the log file, and echoed to
//! stdout while polling.
//!
//! The log file is reopened in append mode per event, so size-based rotation
//! (see [`crate::log_rotation`]) never leaves the writer pointing at a
//! rotated-away inode.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing_subscriber::fmt::writer::{BoxMakeWriter, EitherWriter, MakeWriter, MakeWriterExt};

use crate::error::{io_err, DaemonError};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'; expected: text, json")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// [`MakeWriter`] that appends to a file, reopening it for each event.
#[derive(Debug, Clone)]
pub struct LogFile {
    path: PathBuf,
}

impl LogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> io::Result<File> {
        OpenOptions::new().create(true).append(true).open(&self.path)
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = EitherWriter<File, io::Sink>;

    fn make_writer(&'a self) -> Self::Writer {
        // Logging must never take the runner down; drop the line instead.
        match self.open() {
            Ok(file) => EitherWriter::A(file),
            Err(_) => EitherWriter::B(io::sink()),
        }
    }
}

/// Install the global subscriber. Filter comes from `RUST_LOG`, default `info`.
///
/// Events are appended to `log_path`, and also written to stdout when
/// `echo_stdout` is set. Fails only if the log file cannot be created; a
/// subscriber that is already installed is left in place.
pub fn init_tracing(
    log_path: &Path,
    format: LogFormat,
    echo_stdout: bool,
) -> Result<(), DaemonError> {
    use tracing_subscriber::EnvFilter;

    if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let log_file = LogFile::new(log_path);
    log_file.open().map_err(|e| io_err(log_path, e))?;

    let writer = if echo_stdout {
        BoxMakeWriter::new(io::stdout.and(log_file))
    } else {
        BoxMakeWriter::new(log_file)
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer);

    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    Ok(())
}
