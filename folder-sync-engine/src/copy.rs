//! Atomic, timestamp-preserving file copy.
//!
//! ## `atomic_copy` protocol
//!
//! 1. Copy source bytes (and permissions) to `<dst>.folder-sync.tmp`.
//! 2. Rename the tmp file onto `<dst>` (atomic on POSIX).
//! 3. Stamp `<dst>` with the source's access and modification times.

use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};

use filetime::{set_file_times, FileTime};

use crate::error::{io_err, SyncError};

/// Suffix of the in-flight copy next to its final path.
pub const TMP_SUFFIX: &str = ".folder-sync.tmp";

/// Copy `src` onto `dst` atomically, preserving timestamps.
pub fn atomic_copy(src: &Path, src_meta: &Metadata, dst: &Path) -> Result<(), SyncError> {
    let tmp = tmp_path(dst);
    atomic_copy_with_tmp(src, src_meta, dst, &tmp)
}

fn atomic_copy_with_tmp(
    src: &Path,
    src_meta: &Metadata,
    dst: &Path,
    tmp: &Path,
) -> Result<(), SyncError> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    if let Err(e) = fs::copy(src, tmp) {
        let _ = fs::remove_file(tmp);
        return Err(io_err(src, e));
    }

    if let Err(e) = fs::rename(tmp, dst) {
        let _ = fs::remove_file(tmp);
        return Err(io_err(dst, e));
    }

    let atime = FileTime::from_last_access_time(src_meta);
    let mtime = FileTime::from_last_modification_time(src_meta);
    set_file_times(dst, atime, mtime).map_err(|e| io_err(dst, e))?;
    Ok(())
}

pub(crate) fn tmp_path(dst: &Path) -> PathBuf {
    let mut name = dst.as_os_str().to_owned();
    name.push(TMP_SUFFIX);
    PathBuf::from(name)
}
