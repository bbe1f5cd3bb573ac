//! A single one-way mirror pass from source to destination.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::Utc;

use folder_sync_core::CompareMode;

use crate::compare::{self, Freshness};
use crate::copy;
use crate::error::{io_err, SyncError};
use crate::prune;
use crate::report::{SyncAction, SyncReport};

/// Knobs for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Report what would change without touching the destination.
    pub dry_run: bool,
    /// Remove destination entries that have no source counterpart.
    pub prune: bool,
    pub compare: CompareMode,
}

/// Run one mirror pass of `source` into `destination`.
///
/// Direction is strictly source → destination. Entries are visited
/// breadth-first in file-name order, so reports are deterministic.
///
/// Only problems with the two roots are returned as errors. A file or
/// subdirectory that cannot be read or written is reported as
/// [`SyncAction::Failed`] and the walk carries on with its siblings.
pub fn sync_once(
    source: &Path,
    destination: &Path,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let started_at = Utc::now();

    if !source.is_dir() {
        return Err(SyncError::SourceMissing {
            path: source.to_path_buf(),
        });
    }
    ensure_disjoint(source, destination)?;

    let mut actions = Vec::new();
    let mut seen = HashSet::<PathBuf>::new();
    // Subtrees whose source listing is unknown; prune must not touch them.
    let mut unlisted = HashSet::<PathBuf>::new();
    let mut dirs = vec![PathBuf::new()];
    let mut cursor = 0;

    while cursor < dirs.len() {
        let rel_dir = dirs[cursor].clone();
        cursor += 1;

        let entries = match list_dir(source, destination, &rel_dir, options.dry_run, &mut actions)
        {
            Ok(Some(entries)) => entries,
            Ok(None) => continue,
            Err(err) if rel_dir.as_os_str().is_empty() => return Err(err),
            Err(err) => {
                actions.push(failed(rel_dir.clone(), &err));
                unlisted.insert(rel_dir);
                continue;
            }
        };

        for entry in entries {
            let rel = rel_dir.join(entry.file_name());
            seen.insert(rel.clone());
            match sync_entry(&entry, &rel, destination, options) {
                Ok(Visit::Dir) => dirs.push(rel),
                Ok(Visit::Done(action)) => actions.push(action),
                Err(err) => {
                    actions.push(failed(rel.clone(), &err));
                    unlisted.insert(rel);
                }
            }
        }
    }

    if options.prune {
        actions.extend(prune::prune(
            source,
            destination,
            &seen,
            &unlisted,
            options.dry_run,
        )?);
    }

    Ok(SyncReport {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        dry_run: options.dry_run,
        started_at,
        finished_at: Utc::now(),
        actions,
    })
}

enum Visit {
    Dir,
    Done(SyncAction),
}

/// Prepare the destination directory for `rel_dir` and list its source
/// entries. `None` means the directory is skipped.
fn list_dir(
    source: &Path,
    destination: &Path,
    rel_dir: &Path,
    dry_run: bool,
    actions: &mut Vec<SyncAction>,
) -> Result<Option<Vec<fs::DirEntry>>, SyncError> {
    if !prepare_dir(&destination.join(rel_dir), rel_dir, dry_run, actions)? {
        return Ok(None);
    }
    sorted_entries(&source.join(rel_dir)).map(Some)
}

fn sync_entry(
    entry: &fs::DirEntry,
    rel: &Path,
    destination: &Path,
    options: &SyncOptions,
) -> Result<Visit, SyncError> {
    let src_path = entry.path();
    let file_type = entry.file_type().map_err(|e| io_err(&src_path, e))?;
    if file_type.is_dir() {
        return Ok(Visit::Dir);
    }

    // Symlinks are followed for files only.
    let meta = match fs::metadata(&src_path) {
        Ok(meta) => meta,
        Err(err) if file_type.is_symlink() && err.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(path = %src_path.display(), "skipping broken symlink");
            return Ok(Visit::Done(skipped(rel.to_path_buf(), "broken symlink")));
        }
        Err(err) => return Err(io_err(&src_path, err)),
    };

    let action = if meta.is_dir() {
        tracing::warn!(path = %src_path.display(), "skipping symlinked directory");
        skipped(rel.to_path_buf(), "symlinked directory")
    } else if meta.is_file() {
        let dst_path = destination.join(rel);
        sync_file(&src_path, &meta, &dst_path, rel.to_path_buf(), options)?
    } else {
        skipped(rel.to_path_buf(), "not a regular file")
    };
    Ok(Visit::Done(action))
}

/// Make sure the mirrored directory exists. Returns `false` when the
/// destination path is occupied by something that is not a directory.
fn prepare_dir(
    dst_dir: &Path,
    rel_dir: &Path,
    dry_run: bool,
    actions: &mut Vec<SyncAction>,
) -> Result<bool, SyncError> {
    let path = display_rel(rel_dir);
    match fs::metadata(dst_dir) {
        Ok(meta) if meta.is_dir() => Ok(true),
        Ok(_) => {
            tracing::warn!(path = %dst_dir.display(), "destination is not a directory, skipping");
            actions.push(skipped(path, "destination is not a directory"));
            Ok(false)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            if dry_run {
                actions.push(SyncAction::WouldCreateDir { path });
            } else {
                fs::create_dir_all(dst_dir).map_err(|e| io_err(dst_dir, e))?;
                tracing::debug!(path = %dst_dir.display(), "created directory");
                actions.push(SyncAction::CreatedDir { path });
            }
            Ok(true)
        }
        Err(err) => Err(io_err(dst_dir, err)),
    }
}

fn sync_file(
    src: &Path,
    meta: &fs::Metadata,
    dst: &Path,
    rel: PathBuf,
    options: &SyncOptions,
) -> Result<SyncAction, SyncError> {
    match compare::check(src, meta, dst, options.compare)? {
        Freshness::Current => Ok(SyncAction::Unchanged { path: rel }),
        Freshness::Conflict => {
            tracing::warn!(path = %dst.display(), "destination is not a regular file, skipping");
            Ok(skipped(rel, "destination is not a regular file"))
        }
        Freshness::Missing | Freshness::Stale if options.dry_run => {
            tracing::info!("[dry-run] would copy: {}", src.display());
            Ok(SyncAction::WouldCopy { path: rel })
        }
        Freshness::Missing | Freshness::Stale => {
            copy::atomic_copy(src, meta, dst)?;
            tracing::info!(src = %src.display(), dst = %dst.display(), "file copied");
            Ok(SyncAction::Copied { path: rel })
        }
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<fs::DirEntry>, SyncError> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| io_err(dir, e))?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

/// Reject configurations where one tree contains the other.
fn ensure_disjoint(source: &Path, destination: &Path) -> Result<(), SyncError> {
    let src = fs::canonicalize(source).map_err(|e| io_err(source, e))?;
    let dst = resolve_path(destination)?;
    if dst.starts_with(&src) || src.starts_with(&dst) {
        return Err(SyncError::NestedDestination {
            source_dir: source.to_path_buf(),
            destination: destination.to_path_buf(),
        });
    }
    Ok(())
}

/// Canonicalize the longest existing prefix of `path` and append the rest,
/// applying any `..` in the missing part lexically.
fn resolve_path(path: &Path) -> Result<PathBuf, SyncError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| io_err(path, e))?
            .join(path)
    };

    let mut missing = Vec::new();
    let mut cursor = absolute.as_path();
    loop {
        match fs::canonicalize(cursor) {
            Ok(mut resolved) => {
                for part in missing.iter().rev() {
                    match part {
                        Component::ParentDir => {
                            resolved.pop();
                        }
                        Component::Normal(name) => resolved.push(name),
                        _ => {}
                    }
                }
                return Ok(resolved);
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let Some(parent) = cursor.parent() else {
                    return Ok(absolute.clone());
                };
                if let Some(last) = cursor.components().next_back() {
                    missing.push(last);
                }
                cursor = parent;
            }
            Err(err) => return Err(io_err(cursor, err)),
        }
    }
}

fn display_rel(rel: &Path) -> PathBuf {
    if rel.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        rel.to_path_buf()
    }
}

fn failed(path: PathBuf, err: &SyncError) -> SyncAction {
    let path = display_rel(&path);
    tracing::error!(path = %path.display(), error = %err, "entry failed");
    SyncAction::Failed {
        path,
        error: err.to_string(),
    }
}

fn skipped(path: PathBuf, reason: &str) -> SyncAction {
    SyncAction::Skipped {
        path,
        reason: reason.to_string(),
    }
}
