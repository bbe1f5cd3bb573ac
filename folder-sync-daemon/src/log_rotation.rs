//! Size-based rotation for the `folder_sync` log file.
//!
//! Rotates the log when it exceeds 10 MiB, keeping at most 5 rotated copies:
//!   sync.log → sync.log.1 → sync.log.2 → … → sync.log.5

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Maximum log file size before rotation (10 MiB).
pub const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Maximum number of rotated backup files to keep.
pub const MAX_ROTATED_FILES: usize = 5;

/// Rotate `log_path` if its size reaches `max_bytes`.
///
/// Rotation sequence (oldest first):
///   `<name>.<max_files>` deleted
///   `<name>.<n>` → `<name>.<n+1>` for n = max_files-1 … 1
///   `<name>` → `<name>.1`
///   Create fresh empty `<name>`.
///
/// Returns `true` if rotation occurred. Missing files are not an error.
pub fn rotate_if_needed(log_path: &Path, max_bytes: u64, max_files: usize) -> io::Result<bool> {
    let size = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };

    if size < max_bytes || max_files == 0 {
        return Ok(false);
    }

    let oldest = numbered_path(log_path, max_files);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }

    for n in (1..max_files).rev() {
        let src = numbered_path(log_path, n);
        if src.exists() {
            fs::rename(&src, numbered_path(log_path, n + 1))?;
        }
    }

    fs::rename(log_path, numbered_path(log_path, 1))?;

    fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(log_path)?;

    Ok(true)
}

/// Rotate the configured log file with the default limits.
///
/// Errors are logged as warnings; rotation never stops the runner.
pub fn rotate_log(log_path: &Path) {
    match rotate_if_needed(log_path, MAX_LOG_BYTES, MAX_ROTATED_FILES) {
        Ok(true) => tracing::info!(path = %log_path.display(), "log file rotated"),
        Ok(false) => {}
        Err(err) => tracing::warn!(path = %log_path.display(), error = %err, "log rotation failed"),
    }
}

/// Path of the `n`-th rotated copy of `base` (e.g. `sync.log.2`).
fn numbered_path(base: &Path, n: usize) -> PathBuf {
    let mut name = base
        .file_name()
        .map(|s| s.to_owned())
        .unwrap_or_else(|| "sync.log".into());
    name.push(format!(".{n}"));
    base.with_file_name(name)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SMALL_LIMIT: u64 = 1024;

    fn write_log(path: &Path, size_bytes: usize) {
        fs::write(path, vec![b'x'; size_bytes]).unwrap();
    }

    #[test]
    fn rotation_noop_when_file_under_threshold() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("sync.log");
        write_log(&log, 100);

        let rotated = rotate_if_needed(&log, SMALL_LIMIT, MAX_ROTATED_FILES).unwrap();
        assert!(!rotated);
        assert!(!numbered_path(&log, 1).exists());
    }

    #[test]
    fn rotation_moves_live_log_to_first_backup() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("sync.log");
        write_log(&log, SMALL_LIMIT as usize + 1);

        assert!(rotate_if_needed(&log, SMALL_LIMIT, MAX_ROTATED_FILES).unwrap());
        assert_eq!(fs::metadata(&log).unwrap().len(), 0);
        assert_eq!(
            fs::metadata(numbered_path(&log, 1)).unwrap().len(),
            SMALL_LIMIT + 1
        );
    }

    #[test]
    fn backups_are_capped() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("sync.log");
        for n in 1..=MAX_ROTATED_FILES {
            fs::write(numbered_path(&log, n), format!("rotated-{n}")).unwrap();
        }
        write_log(&log, SMALL_LIMIT as usize);

        assert!(rotate_if_needed(&log, SMALL_LIMIT, MAX_ROTATED_FILES).unwrap());
        assert_eq!(
            fs::read_to_string(numbered_path(&log, MAX_ROTATED_FILES)).unwrap(),
            format!("rotated-{}", MAX_ROTATED_FILES - 1)
        );
        assert!(!numbered_path(&log, MAX_ROTATED_FILES + 1).exists());
    }

    #[test]
    fn missing_log_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let rotated =
            rotate_if_needed(&dir.path().join("absent.log"), SMALL_LIMIT, MAX_ROTATED_FILES)
                .unwrap();
        assert!(!rotated);
    }

    #[test]
    fn numbered_path_keeps_directory() {
        assert_eq!(
            numbered_path(Path::new("/var/log/sync.log"), 3),
            PathBuf::from("/var/log/sync.log.3")
        );
    }
}
