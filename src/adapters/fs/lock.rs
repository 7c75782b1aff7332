use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::core::errors::{BackupError, Result};

/// Cooperative single-instance guard.
///
/// Uses `create_new` semantics: if the lock file already exists another
/// run is in progress. The file is removed when the guard is dropped.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
}

impl InstanceLock {
    /// Lock file guarding `resource`: `<resource>.lock`.
    pub fn path_for(resource: &Path) -> PathBuf {
        let mut name = resource.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Acquire the lock guarding `resource`.
    pub fn acquire(resource: &Path) -> Result<Self> {
        let path = Self::path_for(resource);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = match OpenOptions::new().create_new(true).write(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(BackupError::AlreadyRunning { lock: path });
            }
            Err(e) => return Err(e.into()),
        };
        writeln!(file, "{}", std::process::id())?;

        tracing::debug!(lock = %path.display(), "acquired instance lock");
        Ok(Self { path })
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(lock = %self.path.display(), error = %e, "could not remove instance lock");
        }
    }
}
