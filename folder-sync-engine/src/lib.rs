//! # folder-sync-engine
//!
//! One-way source → destination mirroring.
//!
//! Call [`sync_once`] to run a single pass. Directories missing from the
//! destination are created, files that are missing or out of date are
//! copied with their modification time preserved, and (when pruning)
//! destination entries with no source counterpart are removed.

pub mod compare;
pub mod copy;
pub mod error;
pub mod mirror;
mod prune;
pub mod report;

pub use error::SyncError;
pub use folder_sync_core::CompareMode;
pub use mirror::{sync_once, SyncOptions};
pub use report::{SyncAction, SyncReport};
