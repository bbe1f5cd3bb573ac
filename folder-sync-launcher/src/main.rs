//! sync-launcher — start `folder_sync` with the standard argument set.
//!
//! # Usage
//!
//! ```text
//! sync-launcher [--src <dir>] [--dst <dir>] [--interval <secs>] [--logfile <path>]
//!               [--program <path>] [--flag-style standard|legacy]
//! ```
//!
//! Every flag defaults to the built-in value, so a bare `sync-launcher`
//! runs `folder_sync --src src/ --dst dst/ --interval 5 --logfile sync.log`.
//! The launcher exits with the child's exit code, or 127 if the child could
//! not be started.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use folder_sync_core::defaults;
use folder_sync_launcher::{launch, FlagMapping, LaunchConfig, LAUNCH_FAILURE_EXIT_CODE};

#[derive(Parser, Debug)]
#[command(
    name = "sync-launcher",
    version,
    about = "Start folder_sync with a fixed source, destination, interval, and log file",
    long_about = None,
)]
struct Cli {
    /// Source folder passed to folder_sync.
    #[arg(long = "src", value_name = "DIR", default_value = defaults::SOURCE_PATH)]
    source: PathBuf,

    /// Destination folder passed to folder_sync.
    #[arg(long = "dst", value_name = "DIR", default_value = defaults::DESTINATION_PATH)]
    destination: PathBuf,

    /// Polling interval in seconds, passed through unvalidated.
    #[arg(long, value_name = "SECS", default_value_t = defaults::INTERVAL_SECONDS)]
    interval: u64,

    /// Log file passed to folder_sync.
    #[arg(long = "logfile", value_name = "PATH", default_value = defaults::LOG_PATH)]
    log_file: PathBuf,

    /// Program to start; looked up on PATH unless it contains a path separator.
    #[arg(long, value_name = "PATH", default_value = defaults::PROGRAM)]
    program: OsString,

    /// Flag names to use for the interval and log file options.
    #[arg(long, value_enum, default_value_t = FlagStyle::Standard)]
    flag_style: FlagStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FlagStyle {
    /// --interval / --logfile
    Standard,
    /// --period / --log
    Legacy,
}

impl From<FlagStyle> for FlagMapping {
    fn from(style: FlagStyle) -> Self {
        match style {
            FlagStyle::Standard => FlagMapping::STANDARD,
            FlagStyle::Legacy => FlagMapping::LEGACY,
        }
    }
}

impl From<Cli> for LaunchConfig {
    fn from(cli: Cli) -> Self {
        LaunchConfig {
            program: cli.program,
            source_path: cli.source,
            destination_path: cli.destination,
            interval_seconds: cli.interval,
            log_path: cli.log_file,
            flags: cli.flag_style.into(),
        }
    }
}

fn main() {
    init_tracing();
    let config = LaunchConfig::from(Cli::parse());

    match launch(&config) {
        Ok(outcome) => process::exit(outcome.exit_code()),
        Err(err) => {
            eprintln!("sync-launcher: {err}");
            process::exit(LAUNCH_FAILURE_EXIT_CODE);
        }
    }
}

/// Launcher diagnostics go to stderr; quiet unless `RUST_LOG` asks for more.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
