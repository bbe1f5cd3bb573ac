//! Launcher for the external `folder_sync` program.
//!
//! Builds a typed argument vector from a [`LaunchConfig`] and runs the
//! program once with inherited environment and stdio, reporting its exit
//! status back as a [`LaunchOutcome`].

mod error;
pub mod launcher;

pub use error::LaunchError;
pub use launcher::{launch, FlagMapping, LaunchConfig, LaunchOutcome, LAUNCH_FAILURE_EXIT_CODE};
