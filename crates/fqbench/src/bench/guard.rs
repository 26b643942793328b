//! Backup/restore guard for the original input file.

use std::fs;
use std::path::{Path, PathBuf};

use super::HarnessError;

/// Scoped ownership of an input file during benchmarking.
///
/// Construction copies the file to a `.orig` sibling before anything else
/// touches the file set, so from that point on the filesystem always holds
/// either the working file or its backup. `finish()` restores the original
/// and removes the backup plus any tracked scratch artifacts; restore
/// failures propagate. If the guard is dropped without `finish()` (error or
/// panic unwind), the same restore runs as a finalizer and a failure is
/// logged at ERROR rather than lost.
#[derive(Debug)]
pub struct RestoreGuard {
    original: PathBuf,
    backup: PathBuf,
    scratch: Vec<PathBuf>,
    restored: bool,
}

impl RestoreGuard {
    pub fn new(original: &Path) -> Result<Self, HarnessError> {
        let backup = backup_path(original);
        fs::copy(original, &backup).map_err(|source| HarnessError::BackupFailed {
            path: original.to_path_buf(),
            source,
        })?;
        tracing::debug!("backed up {} -> {}", original.display(), backup.display());
        Ok(Self {
            original: original.to_path_buf(),
            backup,
            scratch: Vec::new(),
            restored: false,
        })
    }

    /// Register a scratch artifact for deletion at restore time. Missing
    /// files are fine; tools delete some of their own artifacts.
    pub fn track(&mut self, path: PathBuf) {
        if !self.scratch.contains(&path) {
            self.scratch.push(path);
        }
    }

    /// Restore the original and clean up, propagating restore failures.
    pub fn finish(mut self) -> Result<(), HarnessError> {
        self.restore()
    }

    fn restore(&mut self) -> Result<(), HarnessError> {
        if self.restored {
            return Ok(());
        }
        fs::copy(&self.backup, &self.original).map_err(|source| HarnessError::RestoreFailed {
            path: self.original.clone(),
            backup: self.backup.clone(),
            source,
        })?;
        self.restored = true;

        for path in &self.scratch {
            if path == &self.original {
                continue;
            }
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("failed to remove scratch file {}: {}", path.display(), e);
                }
            }
        }
        if let Err(e) = fs::remove_file(&self.backup) {
            tracing::warn!("failed to remove backup {}: {}", self.backup.display(), e);
        }
        tracing::debug!("restored {}", self.original.display());
        Ok(())
    }
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = self.restore() {
            // Restore failures risk data loss; the backup is left in place
            // so the operator can recover by hand.
            tracing::error!(
                "restore of {} failed during unwind: {}. Backup left at {}",
                self.original.display(),
                e,
                self.backup.display()
            );
        }
    }
}

/// Sibling backup path: `reads.fastq.gz` -> `reads.fastq.gz.orig`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".orig");
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_restores_original_bytes_and_removes_backup() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("reads.fastq.gz");
        fs::write(&file, b"original").unwrap();

        let guard = RestoreGuard::new(&file).unwrap();
        fs::write(&file, b"clobbered by a tool").unwrap();
        guard.finish().unwrap();

        assert_eq!(fs::read(&file).unwrap(), b"original");
        assert!(!backup_path(&file).exists());
    }

    #[test]
    fn drop_restores_after_file_deletion() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("reads.fastq.gz");
        fs::write(&file, b"original").unwrap();

        {
            let _guard = RestoreGuard::new(&file).unwrap();
            fs::remove_file(&file).unwrap();
        }

        assert_eq!(fs::read(&file).unwrap(), b"original");
    }

    #[test]
    fn tracked_scratch_files_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("reads.fastq.gz");
        let scratch = dir.path().join("reads.fastq");
        fs::write(&file, b"original").unwrap();
        fs::write(&scratch, b"intermediate").unwrap();

        let mut guard = RestoreGuard::new(&file).unwrap();
        guard.track(scratch.clone());
        guard.finish().unwrap();

        assert!(!scratch.exists());
        assert_eq!(fs::read(&file).unwrap(), b"original");
    }

    #[test]
    fn finish_propagates_restore_failure_when_backup_is_gone() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("reads.fastq.gz");
        fs::write(&file, b"original").unwrap();

        let guard = RestoreGuard::new(&file).unwrap();
        fs::remove_file(backup_path(&file)).unwrap();

        let err = guard.finish().unwrap_err();
        assert!(matches!(err, HarnessError::RestoreFailed { .. }));
    }

    #[test]
    fn backup_of_missing_file_fails_before_touching_anything() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("ghost.fastq.gz");
        let err = RestoreGuard::new(&file).unwrap_err();
        assert!(matches!(err, HarnessError::BackupFailed { .. }));
        assert!(!backup_path(&file).exists());
    }
}
