//! Locked, atomic file access shared by the credential store and the ledger.
//!
//! Each persisted file `foo` has a sidecar `foo.lock`. Readers hold a shared
//! lock on it; writers hold an exclusive lock while they write a temp file in
//! the same directory and rename it over the target.

use crate::{Error, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Advisory lock held for the lifetime of the guard
pub struct FileLock {
    file: File,
}

impl FileLock {
    /// Acquire a shared lock guarding `path`
    pub fn shared(path: &Path) -> Result<Self> {
        let file = open_lock_file(path)?;
        file.lock_shared()?;
        Ok(Self { file })
    }

    /// Acquire an exclusive lock guarding `path`
    pub fn exclusive(path: &Path) -> Result<Self> {
        let file = open_lock_file(path)?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Path of the sidecar lock file for `path`
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

fn open_lock_file(path: &Path) -> Result<File> {
    ensure_parent_dir(path)?;
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(lock_path(path))?;
    Ok(file)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Replace the contents of `path` atomically
///
/// 1. Takes the exclusive sidecar lock
/// 2. Writes to a temp file in the same directory via `write`
/// 3. Syncs to disk
/// 4. Renames over the original
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&File>) -> Result<()>,
{
    let _lock = FileLock::exclusive(path)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = NamedTempFile::new_in(dir)?;

    {
        let mut writer = BufWriter::new(temp.as_file());
        write(&mut writer)?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::StorageUnavailable(e.error))?;

    tracing::debug!("Rewrote {:?}", path);
    Ok(())
}
