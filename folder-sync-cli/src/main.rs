//! folder_sync — one-way folder mirroring on a polling interval.
//!
//! # Usage
//!
//! ```text
//! folder_sync --src <dir> --dst <dir> [--interval <secs>] [--logfile <path>]
//!             [--config <file.yaml>] [--once] [--dry-run] [--prune | --no-prune]
//!             [--compare mtime|checksum] [--json] [--log-format text|json]
//! ```
//!
//! `--period` and `--log` are accepted as aliases of `--interval` and
//! `--logfile`.

mod output;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use folder_sync_core::{
    config::{self, ConfigOverrides},
    CompareMode, SyncConfig,
};
use folder_sync_daemon::LogFormat;
use folder_sync_engine::{sync_once, SyncOptions};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "folder_sync",
    version,
    about = "Mirror a source folder into a destination folder on a fixed interval",
    long_about = None,
)]
struct Cli {
    /// Source folder to mirror from.
    #[arg(long = "src", value_name = "DIR")]
    source: Option<PathBuf>,

    /// Destination folder to mirror into.
    #[arg(long = "dst", value_name = "DIR")]
    destination: Option<PathBuf>,

    /// Seconds between sync passes.
    #[arg(long, alias = "period", value_name = "SECS")]
    interval: Option<u64>,

    /// File that log lines are appended to.
    #[arg(long = "logfile", alias = "log", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// YAML config file; command-line flags take precedence.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run a single pass and exit instead of polling.
    #[arg(long)]
    once: bool,

    /// Report what would change without touching the destination.
    #[arg(long)]
    dry_run: bool,

    /// Remove destination entries that no longer exist in the source.
    #[arg(long, overrides_with = "no_prune")]
    prune: bool,

    /// Keep extraneous destination entries, even if the config file enables pruning.
    #[arg(long, overrides_with = "prune")]
    no_prune: bool,

    /// How to decide that a destination file is out of date.
    #[arg(long, value_name = "MODE")]
    compare: Option<CompareMode>,

    /// With `--once`, print the pass report as JSON.
    #[arg(long, requires = "once")]
    json: bool,

    /// Log line format.
    #[arg(long, default_value_t = LogFormat::Text, value_name = "FORMAT")]
    log_format: LogFormat,
}

impl Cli {
    fn resolve(&self) -> Result<(SyncConfig, SyncOptions)> {
        let file = match &self.config {
            Some(path) => Some(
                config::load_at(path)
                    .with_context(|| format!("failed to load config {}", path.display()))?,
            ),
            None => None,
        };

        let overrides = ConfigOverrides {
            source: self.source.clone(),
            destination: self.destination.clone(),
            interval_seconds: self.interval,
            log_file: self.log_file.clone(),
        };
        let sync_config =
            config::resolve(file.as_ref(), overrides).context("invalid configuration")?;

        let options = SyncOptions {
            dry_run: self.dry_run,
            prune: self
                .prune_flag()
                .or(file.as_ref().and_then(|f| f.prune))
                .unwrap_or(false),
            compare: self
                .compare
                .or(file.as_ref().and_then(|f| f.compare))
                .unwrap_or_default(),
        };
        Ok((sync_config, options))
    }

    fn prune_flag(&self) -> Option<bool> {
        match (self.prune, self.no_prune) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (sync_config, options) = cli.resolve()?;

    if cli.once {
        folder_sync_daemon::init_tracing(&sync_config.log_path, cli.log_format, false)
            .context("failed to open log file")?;
        let report = sync_once(
            &sync_config.source_path,
            &sync_config.destination_path,
            &options,
        )
        .context("sync failed")?;
        if cli.json {
            output::print_json(&report)?;
        } else {
            output::print_report(&report);
        }
        if report.failed() > 0 {
            bail!("{} entries could not be synced", report.failed());
        }
        return Ok(());
    }

    folder_sync_daemon::start_blocking(sync_config, options, cli.log_format)
        .context("folder sync exited with error")
}
