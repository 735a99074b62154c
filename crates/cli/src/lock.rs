//! Liveness lock preventing overlapping runs.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::error::{CliError, Result};

/// Exclusive advisory lock on the job's lock file
///
/// Holds the current pid while the run lasts. Released on drop, or by the
/// OS when the process exits.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    /// Take the lock without waiting
    ///
    /// Fails with [`CliError::LockUnavailable`] when another process holds it.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CliError::lock(path, e))?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| CliError::lock(path, e))?;

        if let Err(e) = file.try_lock_exclusive() {
            if is_contended(&e) {
                return Err(CliError::lock_unavailable(path));
            }
            return Err(CliError::lock(path, e));
        }

        write_pid(&mut file).map_err(|e| CliError::lock(path, e))?;
        debug!(path = %path.display(), pid = std::process::id(), "Lock acquired");

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "Failed to release lock");
            return;
        }
        debug!(path = %self.path.display(), "Lock released");
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

fn write_pid(file: &mut File) -> io::Result<()> {
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;
    file.flush()
}
