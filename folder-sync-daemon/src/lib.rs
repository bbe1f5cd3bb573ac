//! Periodic runner for `folder_sync`: sync ticker + log rotation + shutdown.

mod error;
pub mod log_rotation;
pub mod logging;
mod runtime;

pub use error::DaemonError;
pub use logging::{init_tracing, LogFile, LogFormat};
pub use runtime::{start_blocking, PassSummary, Runner};
