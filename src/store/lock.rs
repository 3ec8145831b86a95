// Advisory lock guarding the event log.
//
// The lock lives in a sidecar `<log>.lock` file rather than on the log
// itself: the verification rewrite swaps the log's inode via rename, and a
// lock held on the old inode would no longer exclude anyone.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;

/// Held for the duration of a store operation; released on drop.
pub struct StoreLock {
    file: File,
}

impl StoreLock {
    /// Block until this process holds the only lock on the store.
    pub fn exclusive(log_path: &Path) -> Result<Self> {
        let file = open_lock_file(log_path)?;
        FileExt::lock_exclusive(&file)
            .with_context(|| format!("Failed to lock {}", log_path.display()))?;
        Ok(Self { file })
    }

    /// Block until no writer holds the store.
    pub fn shared(log_path: &Path) -> Result<Self> {
        let file = open_lock_file(log_path)?;
        FileExt::lock_shared(&file)
            .with_context(|| format!("Failed to lock {}", log_path.display()))?;
        Ok(Self { file })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// `<log>.lock` next to the log file.
pub fn lock_path(log_path: &Path) -> PathBuf {
    sibling_path(log_path, ".lock")
}

/// `<log><suffix>` in the same directory, so renames stay on one filesystem.
pub(crate) fn sibling_path(log_path: &Path, suffix: &str) -> PathBuf {
    let mut name = log_path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Create the log's parent directory if it does not exist yet.
pub(crate) fn ensure_parent_dir(log_path: &Path) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create directory for event log: {}", log_path.display())
            })?;
        }
    }
    Ok(())
}

fn open_lock_file(log_path: &Path) -> Result<File> {
    ensure_parent_dir(log_path)?;
    let path = lock_path(log_path);
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&path)
        .with_context(|| format!("Failed to open lock file {}", path.display()))
}
