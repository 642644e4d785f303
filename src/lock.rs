//! Exclusive lock preventing two releases from running against one repository.
//!
//! The lock is an advisory `flock` on `<git-dir>/release.lock`. The kernel
//! drops it when the holding process exits for any reason, so an interrupted
//! run never leaves a lock behind. The PID written into the file is only a
//! diagnostic for the operator.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::fcntl::{Flock, FlockArg};

use log::debug;

use crate::error::{ReleaseError, Result};

/// File locked inside the git directory while a release runs.
pub const LOCK_FILE: &str = "release.lock";

/// Held for the lifetime of a release run. Dropping it releases the lock.
pub struct ReleaseLock {
    path: PathBuf,
    #[cfg(unix)]
    file: Flock<File>,
    #[cfg(not(unix))]
    file: File,
}

impl ReleaseLock {
    /// Lock `release.lock` in `dir`, failing immediately if another run holds it.
    pub fn acquire(dir: &Path) -> Result<Self> {
        let path = dir.join(LOCK_FILE);

        // Never create_new or remove the file: the inode must stay stable for flock.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                ReleaseError::lock(format!("cannot create {}: {}", path.display(), e))
            })?;

        #[cfg(unix)]
        let file = match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(locked) => locked,
            Err((_, errno)) if errno == Errno::EWOULDBLOCK => {
                return Err(held_elsewhere(&path));
            }
            Err((_, errno)) => {
                return Err(ReleaseError::lock(format!(
                    "cannot lock {}: {}",
                    path.display(),
                    errno
                )));
            }
        };

        let lock = ReleaseLock { path, file };
        lock.record_pid()?;
        debug!("acquired {}", lock.path.display());
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record_pid(&self) -> Result<()> {
        let mut handle: &File = &self.file;
        handle.set_len(0)?;
        writeln!(handle, "{}", std::process::id())?;
        handle.sync_all()?;
        Ok(())
    }
}

impl fmt::Debug for ReleaseLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseLock")
            .field("path", &self.path)
            .finish()
    }
}

impl Drop for ReleaseLock {
    fn drop(&mut self) {
        // Clear the PID; the flock itself goes away with the handle.
        let _ = self.file.set_len(0);
    }
}

#[cfg(unix)]
fn held_elsewhere(path: &Path) -> ReleaseError {
    let holder = fs::read_to_string(path)
        .map(|pid| pid.trim().to_string())
        .unwrap_or_default();
    let holder = if holder.is_empty() {
        "unknown".to_string()
    } else {
        holder
    };
    ReleaseError::lock(format!(
        "another release is in progress (pid {}, lock {})",
        holder,
        path.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_writes_pid() {
        let dir = TempDir::new().unwrap();
        let lock = ReleaseLock::acquire(dir.path()).unwrap();

        let content = fs::read_to_string(lock.path()).unwrap();
        assert_eq!(content.trim(), std::process::id().to_string());
    }

    #[cfg(unix)]
    #[test]
    fn test_second_acquire_fails() {
        let dir = TempDir::new().unwrap();
        let _lock = ReleaseLock::acquire(dir.path()).unwrap();

        let err = ReleaseLock::acquire(dir.path()).unwrap_err();
        assert_eq!(err.category(), "LockError");
        assert!(err.to_string().contains("another release is in progress"));
        assert!(err.to_string().contains(&std::process::id().to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_lock_released_when_holder_dies_without_cleanup() {
        let dir = TempDir::new().unwrap();
        let lock = std::mem::ManuallyDrop::new(ReleaseLock::acquire(dir.path()).unwrap());

        // Close the descriptor without running Drop, as the kernel does for a killed process.
        // SAFETY: `lock` is never dropped or used again, so `file` is moved out exactly once.
        let file = unsafe { std::ptr::read(&lock.file) };
        drop(file);

        let stale = fs::read_to_string(dir.path().join(LOCK_FILE)).unwrap();
        assert_eq!(stale.trim(), std::process::id().to_string());

        let relocked = ReleaseLock::acquire(dir.path()).unwrap();
        assert!(relocked.path().exists());
    }

    #[test]
    fn test_drop_releases_lock() {
        let dir = TempDir::new().unwrap();
        {
            let _lock = ReleaseLock::acquire(dir.path()).unwrap();
        }
        let lock = ReleaseLock::acquire(dir.path()).unwrap();
        assert!(lock.path().exists());
    }

    #[test]
    fn test_leftover_file_from_killed_run_does_not_block() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(LOCK_FILE), "4194303\n").unwrap();

        let lock = ReleaseLock::acquire(dir.path()).unwrap();
        let content = fs::read_to_string(lock.path()).unwrap();
        assert_eq!(content.trim(), std::process::id().to_string());
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = ReleaseLock::acquire(&dir.path().join("missing")).unwrap_err();
        assert!(err.to_string().contains("cannot create"));
    }
}
