//! Freshness checks: decide whether a destination file must be recopied.

use std::fs::{self, File, Metadata};
use std::io;
use std::path::Path;

use filetime::FileTime;
use sha2::{Digest, Sha256};

use folder_sync_core::CompareMode;

use crate::error::{io_err, SyncError};

/// Result of comparing a source file against its destination counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Destination does not exist.
    Missing,
    /// Destination exists but differs under the active [`CompareMode`].
    Stale,
    /// Destination is up to date.
    Current,
    /// Destination exists but is not a regular file.
    Conflict,
}

/// Compare `src` (already stat'ed as `src_meta`) with `dst`.
pub fn check(
    src: &Path,
    src_meta: &Metadata,
    dst: &Path,
    mode: CompareMode,
) -> Result<Freshness, SyncError> {
    let dst_meta = match fs::metadata(dst) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Freshness::Missing),
        Err(err) => return Err(io_err(dst, err)),
    };
    if !dst_meta.is_file() {
        return Ok(Freshness::Conflict);
    }

    let same = match mode {
        CompareMode::Mtime => {
            src_meta.len() == dst_meta.len()
                && FileTime::from_last_modification_time(src_meta)
                    == FileTime::from_last_modification_time(&dst_meta)
        }
        CompareMode::Checksum => {
            src_meta.len() == dst_meta.len() && sha256_file(src)? == sha256_file(dst)?
        }
    };

    Ok(if same {
        Freshness::Current
    } else {
        Freshness::Stale
    })
}

/// Hex-encoded SHA-256 digest of a file's contents.
pub fn sha256_file(path: &Path) -> Result<String, SyncError> {
    let mut file = File::open(path).map_err(|e| io_err(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| io_err(path, e))?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::set_file_mtime;
    use tempfile::TempDir;

    #[test]
    fn missing_destination() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.txt");
        fs::write(&src, "hello").unwrap();
        let meta = fs::metadata(&src).unwrap();

        let result = check(&src, &meta, &dir.path().join("b.txt"), CompareMode::Mtime).unwrap();
        assert_eq!(result, Freshness::Missing);
    }

    #[test]
    fn mtime_mode_ignores_content_when_size_and_mtime_match() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.txt");
        let dst = dir.path().join("b.txt");
        fs::write(&src, "hello").unwrap();
        fs::write(&dst, "jello").unwrap();
        let stamp = FileTime::from_unix_time(1_600_000_000, 0);
        set_file_mtime(&src, stamp).unwrap();
        set_file_mtime(&dst, stamp).unwrap();
        let meta = fs::metadata(&src).unwrap();

        assert_eq!(
            check(&src, &meta, &dst, CompareMode::Mtime).unwrap(),
            Freshness::Current
        );
        assert_eq!(
            check(&src, &meta, &dst, CompareMode::Checksum).unwrap(),
            Freshness::Stale
        );
    }

    #[test]
    fn checksum_mode_ignores_mtime_when_content_matches() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.txt");
        let dst = dir.path().join("b.txt");
        fs::write(&src, "same").unwrap();
        fs::write(&dst, "same").unwrap();
        set_file_mtime(&dst, FileTime::from_unix_time(1_000, 0)).unwrap();
        let meta = fs::metadata(&src).unwrap();

        assert_eq!(
            check(&src, &meta, &dst, CompareMode::Checksum).unwrap(),
            Freshness::Current
        );
        assert_eq!(
            check(&src, &meta, &dst, CompareMode::Mtime).unwrap(),
            Freshness::Stale
        );
    }

    #[test]
    fn directory_at_destination_is_conflict() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.txt");
        fs::write(&src, "x").unwrap();
        let dst = dir.path().join("taken");
        fs::create_dir(&dst).unwrap();
        let meta = fs::metadata(&src).unwrap();

        assert_eq!(
            check(&src, &meta, &dst, CompareMode::Mtime).unwrap(),
            Freshness::Conflict
        );
    }

    #[test]
    fn sha256_of_known_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("abc.txt");
        fs::write(&path, "abc").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
