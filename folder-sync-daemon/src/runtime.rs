use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, MissedTickBehavior};

use folder_sync_core::SyncConfig;
use folder_sync_engine::{sync_once, SyncError, SyncOptions, SyncReport};

use crate::error::{io_err, DaemonError};
use crate::logging::{init_tracing, LogFormat};

const ROTATION_PERIOD: Duration = Duration::from_secs(5);

/// Outcome of one scheduled pass, as logged and as sent to observers.
#[derive(Debug, Clone, Serialize)]
pub struct PassSummary {
    pub pass: u64,
    pub ok: bool,
    pub copied: usize,
    pub unchanged: usize,
    pub created_dirs: usize,
    pub removed: usize,
    /// Entries that failed inside an otherwise completed pass.
    pub failed: usize,
    pub duration_ms: u128,
    pub error: Option<String>,
}

/// Polls `source` into `destination` every `interval` until shutdown.
pub struct Runner {
    config: Arc<SyncConfig>,
    options: SyncOptions,
    summaries: Option<mpsc::UnboundedSender<PassSummary>>,
}

impl Runner {
    pub fn new(config: SyncConfig, options: SyncOptions) -> Self {
        Self {
            config: Arc::new(config),
            options,
            summaries: None,
        }
    }

    /// Receive a [`PassSummary`] after every pass.
    pub fn with_summaries(mut self, tx: mpsc::UnboundedSender<PassSummary>) -> Self {
        self.summaries = Some(tx);
        self
    }

    /// Run until a message is sent on `shutdown` or ctrl-c is received.
    pub async fn run(self, shutdown: broadcast::Sender<()>) -> Result<(), DaemonError> {
        tracing::info!(
            src = %self.config.source_path.display(),
            dst = %self.config.destination_path.display(),
            interval_secs = self.config.interval.get(),
            dry_run = self.options.dry_run,
            prune = self.options.prune,
            compare = %self.options.compare,
            "folder sync started",
        );

        let ticker_handle = {
            let shutdown = shutdown.clone();
            let config = self.config.clone();
            let options = self.options;
            let summaries = self.summaries;
            tokio::spawn(async move {
                let result =
                    sync_ticker_task(config, options, summaries, shutdown.subscribe()).await;
                let _ = shutdown.send(());
                result
            })
        };

        let rotation_handle = {
            let shutdown = shutdown.clone();
            let log_path = self.config.log_path.clone();
            tokio::spawn(async move {
                let result = log_rotation_task(log_path, shutdown.subscribe()).await;
                let _ = shutdown.send(());
                result
            })
        };

        let signal_handle = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                let mut shutdown_rx = shutdown.subscribe();
                tokio::select! {
                    _ = shutdown_rx.recv() => Ok(()),
                    signal = tokio::signal::ctrl_c() => {
                        match signal {
                            Ok(()) => {
                                tracing::info!("received ctrl-c, shutting down");
                                let _ = shutdown.send(());
                                Ok(())
                            }
                            Err(err) => Err(DaemonError::Task(format!("ctrl-c handler failed: {err}"))),
                        }
                    }
                }
            })
        };

        let (ticker_result, rotation_result, signal_result) =
            tokio::join!(ticker_handle, rotation_handle, signal_handle);

        handle_join("sync_ticker", ticker_result)?;
        handle_join("log_rotation", rotation_result)?;
        handle_join("signal_handler", signal_result)?;
        tracing::info!("folder sync stopped");
        Ok(())
    }
}

/// Initialise logging, build the runtime, and block until ctrl-c.
pub fn start_blocking(
    config: SyncConfig,
    options: SyncOptions,
    log_format: LogFormat,
) -> Result<(), DaemonError> {
    init_tracing(&config.log_path, log_format, true)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(async move {
        let (shutdown_tx, _) = broadcast::channel::<()>(16);
        Runner::new(config, options).run(shutdown_tx).await
    })
}

async fn sync_ticker_task(
    config: Arc<SyncConfig>,
    options: SyncOptions,
    summaries: Option<mpsc::UnboundedSender<PassSummary>>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let mut interval = tokio::time::interval(config.interval.as_duration());
    // A slow pass delays the next one instead of triggering a burst.
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut pass = 0u64;

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = interval.tick() => {
                pass += 1;
                let started = Instant::now();
                let pass_config = config.clone();
                let result = tokio::task::spawn_blocking(move || {
                    sync_once(&pass_config.source_path, &pass_config.destination_path, &options)
                })
                .await
                .map_err(|err| DaemonError::Task(format!("sync pass join error: {err}")))?;

                let summary = build_pass_summary(pass, result, started.elapsed());
                log_pass(&summary);
                if let Some(tx) = &summaries {
                    let _ = tx.send(summary);
                }
            }
        }
    }

    Ok(())
}

async fn log_rotation_task(
    log_path: PathBuf,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let mut interval = tokio::time::interval(ROTATION_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await; // consume the first immediate tick

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = interval.tick() => {
                let log_path = log_path.clone();
                tokio::task::spawn_blocking(move || {
                    crate::log_rotation::rotate_log(&log_path);
                })
                .await
                .ok(); // rotation errors are logged inside rotate_log
            }
        }
    }
    Ok(())
}

fn build_pass_summary(
    pass: u64,
    result: Result<SyncReport, SyncError>,
    duration: Duration,
) -> PassSummary {
    match result {
        Ok(report) => PassSummary {
            pass,
            ok: true,
            copied: report.copied(),
            unchanged: report.unchanged(),
            created_dirs: report.created_dirs(),
            removed: report.removed(),
            failed: report.failed(),
            duration_ms: duration.as_millis(),
            error: None,
        },
        Err(err) => PassSummary {
            pass,
            ok: false,
            copied: 0,
            unchanged: 0,
            created_dirs: 0,
            removed: 0,
            failed: 0,
            duration_ms: duration.as_millis(),
            error: Some(err.to_string()),
        },
    }
}

fn log_pass(summary: &PassSummary) {
    match &summary.error {
        None => tracing::info!(
            pass = summary.pass,
            copied = summary.copied,
            unchanged = summary.unchanged,
            created_dirs = summary.created_dirs,
            removed = summary.removed,
            failed = summary.failed,
            duration_ms = summary.duration_ms,
            "sync pass completed",
        ),
        Some(err) => tracing::error!(pass = summary.pass, error = %err, "sync pass failed"),
    }
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Task(format!("{task} task join failure: {err}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use folder_sync_core::IntervalSecs;
    use tempfile::TempDir;

    fn config_in(root: &TempDir, interval_secs: u64) -> SyncConfig {
        SyncConfig {
            source_path: root.path().join("src"),
            destination_path: root.path().join("dst"),
            interval: IntervalSecs::new(interval_secs).expect("interval"),
            log_path: root.path().join("sync.log"),
        }
    }

    async fn next_summary(rx: &mut mpsc::UnboundedReceiver<PassSummary>) -> PassSummary {
        tokio::time::timeout(Duration::from_secs(300), rx.recv())
            .await
            .expect("summary within timeout")
            .expect("summary channel open")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn first_pass_runs_immediately_and_shutdown_stops_runner() {
        let root = TempDir::new().expect("tempdir");
        let config = config_in(&root, 3600);
        fs::create_dir_all(&config.source_path).expect("mkdir src");
        fs::write(config.source_path.join("a.txt"), "alpha").expect("write");

        let (summary_tx, mut summary_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, _) = broadcast::channel::<()>(4);
        let runner = Runner::new(config.clone(), SyncOptions::default()).with_summaries(summary_tx);
        let handle = tokio::spawn(runner.run(shutdown_tx.clone()));

        let summary = next_summary(&mut summary_rx).await;
        assert!(summary.ok, "pass failed: {:?}", summary.error);
        assert_eq!(summary.pass, 1);
        assert_eq!(summary.copied, 1);
        assert_eq!(
            fs::read_to_string(config.destination_path.join("a.txt")).expect("read"),
            "alpha"
        );

        shutdown_tx.send(()).expect("send shutdown");
        handle.await.expect("join").expect("runner result");
    }

    // Paused clock: the runtime jumps straight to the next tick once idle.
    #[tokio::test(start_paused = true)]
    async fn failed_pass_is_reported_and_polling_continues() {
        let root = TempDir::new().expect("tempdir");
        let config = config_in(&root, 60);

        let (summary_tx, mut summary_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, _) = broadcast::channel::<()>(4);
        let runner = Runner::new(config.clone(), SyncOptions::default()).with_summaries(summary_tx);
        let handle = tokio::spawn(runner.run(shutdown_tx.clone()));

        let first = next_summary(&mut summary_rx).await;
        assert!(!first.ok);
        assert!(first
            .error
            .as_deref()
            .unwrap_or_default()
            .contains("does not exist"));

        fs::create_dir_all(&config.source_path).expect("mkdir src");
        let before_second = Instant::now();
        let second = next_summary(&mut summary_rx).await;
        assert_eq!(second.pass, 2);
        assert!(second.ok, "pass failed: {:?}", second.error);
        assert!(before_second.elapsed() >= Duration::from_secs(59));

        shutdown_tx.send(()).expect("send shutdown");
        handle.await.expect("join").expect("runner result");
    }

    #[test]
    fn summary_from_error_has_zero_counts() {
        let summary = build_pass_summary(
            7,
            Err(SyncError::SourceMissing {
                path: PathBuf::from("src/"),
            }),
            Duration::from_millis(3),
        );
        assert_eq!(summary.pass, 7);
        assert!(!summary.ok);
        assert_eq!(summary.copied, 0);
        assert_eq!(summary.duration_ms, 3);
        assert_eq!(
            summary.error.as_deref(),
            Some("source directory 'src/' does not exist")
        );
    }

    #[test]
    fn summary_serializes_for_observers() {
        let summary = build_pass_summary(
            1,
            Err(SyncError::SourceMissing {
                path: PathBuf::from("src/"),
            }),
            Duration::ZERO,
        );
        let json = serde_json::to_value(&summary).expect("json");
        assert_eq!(json["ok"], serde_json::Value::Bool(false));
        assert_eq!(json["pass"], serde_json::json!(1));
    }
}
