use crate::error::StoreError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Exclusive writer for a snapshot file.
///
/// Data goes to `<target>.lock` and is renamed over `<target>` on commit, so
/// readers only ever see a complete snapshot. A second writer fails with
/// [`StoreError::LockConflict`] while the lock exists.
pub struct Lockfile {
    target: PathBuf,
    lock_path: PathBuf,
    file: Option<fs::File>,
}

impl Lockfile {
    pub fn acquire(target: impl AsRef<Path>) -> Result<Self, StoreError> {
        let target = target.as_ref().to_path_buf();
        let lock_path = target.with_extension(
            target
                .extension()
                .map(|e| format!("{}.lock", e.to_string_lossy()))
                .unwrap_or_else(|| "lock".to_string()),
        );

        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }

        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(file) => Ok(Self {
                target,
                lock_path,
                file: Some(file),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(StoreError::LockConflict(lock_path.display().to_string()))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<(), StoreError> {
        match self.file {
            Some(ref mut file) => {
                file.write_all(data)?;
                file.flush()?;
                Ok(())
            }
            None => Err(StoreError::LockConflict(
                "lock file already committed".into(),
            )),
        }
    }

    pub fn commit(mut self) -> Result<(), StoreError> {
        self.file.take();
        fs::rename(&self.lock_path, &self.target)?;
        Ok(())
    }
}

impl Drop for Lockfile {
    fn drop(&mut self) {
        if self.file.is_some() {
            let _ = fs::remove_file(&self.lock_path);
        }
    }
}

/// Replace `target` with `data` under a lock.
pub fn write_snapshot(target: impl AsRef<Path>, data: &[u8]) -> Result<(), StoreError> {
    let mut lock = Lockfile::acquire(target)?;
    lock.write_all(data)?;
    lock.commit()
}
