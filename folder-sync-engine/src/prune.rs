//! Removal of destination entries that no longer exist in the source.
//!
//! Only the top-most extraneous entry of a subtree is reported; removing a
//! directory removes everything under it. Symlinks in the destination are
//! removed as links, never followed.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};
use crate::report::SyncAction;

/// Remove every entry under `destination` whose relative path is not in `keep`.
///
/// Only descends into destination directories whose source counterpart is
/// also a directory and was listed in full; type conflicts and unreadable
/// subtrees are left for the mirror pass to report.
pub(crate) fn prune(
    source: &Path,
    destination: &Path,
    keep: &HashSet<PathBuf>,
    unlisted: &HashSet<PathBuf>,
    dry_run: bool,
) -> Result<Vec<SyncAction>, SyncError> {
    let mut actions = Vec::new();
    if !destination.is_dir() {
        return Ok(actions);
    }

    for rel in extraneous(source, destination, keep, unlisted)? {
        let path = destination.join(&rel);
        if dry_run {
            tracing::info!("[dry-run] would remove: {}", path.display());
            actions.push(SyncAction::WouldRemove { path: rel });
            continue;
        }
        match remove_entry(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "removed extraneous entry");
                actions.push(SyncAction::Removed { path: rel });
            }
            Err(err) => {
                tracing::error!(
                    path = %path.display(),
                    error = %err,
                    "failed to remove extraneous entry",
                );
                actions.push(SyncAction::Failed {
                    path: rel,
                    error: err.to_string(),
                });
            }
        }
    }
    Ok(actions)
}

fn extraneous(
    source: &Path,
    destination: &Path,
    keep: &HashSet<PathBuf>,
    unlisted: &HashSet<PathBuf>,
) -> Result<Vec<PathBuf>, SyncError> {
    let mut found = Vec::new();
    let mut dirs = vec![PathBuf::new()];
    let mut cursor = 0;

    while cursor < dirs.len() {
        let rel_dir = dirs[cursor].clone();
        cursor += 1;
        let dir = destination.join(&rel_dir);

        let mut entries = match fs::read_dir(&dir) {
            Ok(entries) => entries
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| io_err(&dir, e))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => return Err(io_err(&dir, err)),
        };
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let rel = rel_dir.join(entry.file_name());
            if !keep.contains(&rel) {
                found.push(rel);
                continue;
            }
            let ty = entry.file_type().map_err(|e| io_err(entry.path(), e))?;
            if ty.is_dir() && source.join(&rel).is_dir() && !unlisted.contains(&rel) {
                dirs.push(rel);
            }
        }
    }
    Ok(found)
}

fn remove_entry(path: &Path) -> Result<(), SyncError> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(io_err(path, err)),
    };
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| io_err(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn extraneous_reports_only_topmost_entry() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(dst.path().join("old/deeper")).unwrap();
        fs::write(dst.path().join("old/deeper/file.txt"), "x").unwrap();
        fs::write(dst.path().join("kept.txt"), "x").unwrap();

        let keep: HashSet<PathBuf> = [PathBuf::from("kept.txt")].into_iter().collect();
        let found = extraneous(src.path(), dst.path(), &keep, &HashSet::new()).unwrap();
        assert_eq!(found, vec![PathBuf::from("old")]);
    }

    #[test]
    fn directory_shadowing_a_source_file_is_not_descended() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::write(src.path().join("name"), "file in source").unwrap();
        fs::create_dir_all(dst.path().join("name")).unwrap();
        fs::write(dst.path().join("name/inner.txt"), "x").unwrap();

        let keep: HashSet<PathBuf> = [PathBuf::from("name")].into_iter().collect();
        assert!(extraneous(src.path(), dst.path(), &keep, &HashSet::new()).unwrap().is_empty());
    }

    #[test]
    fn unlisted_directory_is_not_descended() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("locked")).unwrap();
        fs::create_dir_all(dst.path().join("locked")).unwrap();
        fs::write(dst.path().join("locked/earlier.txt"), "x").unwrap();

        let keep: HashSet<PathBuf> = [PathBuf::from("locked")].into_iter().collect();
        let unlisted = keep.clone();
        assert!(extraneous(src.path(), dst.path(), &keep, &unlisted)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn prune_dry_run_removes_nothing() {
        let src = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("stray.txt"), "x").unwrap();

        let actions = prune(src.path(), dir.path(), &HashSet::new(), &HashSet::new(), true).unwrap();
        assert_eq!(
            actions,
            vec![SyncAction::WouldRemove {
                path: PathBuf::from("stray.txt")
            }]
        );
        assert!(dir.path().join("stray.txt").exists());
    }
}
