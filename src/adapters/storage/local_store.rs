use std::fs;
use std::path::{Path, PathBuf};

use crate::adapters::fs::atomic;
use crate::core::errors::{BackupError, Result};
use crate::core::traits::object_store::ObjectStore;

/// Object store backed by a local directory: `<root>/<bucket>/<object>`.
///
/// Useful for offline backups to a mounted drive.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    bucket_dir: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: &Path, bucket: &str) -> Result<Self> {
        validate_object_name(bucket)?;
        Ok(Self {
            bucket_dir: root.join(bucket),
        })
    }

    fn object_path(&self, object: &str) -> Result<PathBuf> {
        validate_object_name(object)?;
        Ok(self.bucket_dir.join(object))
    }
}

/// Object and bucket names must be a single plain path component.
pub(crate) fn validate_object_name(name: &str) -> Result<()> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0');
    if plain {
        Ok(())
    } else {
        Err(BackupError::StorageFailed {
            reason: format!("Invalid object name '{name}'"),
        })
    }
}

impl ObjectStore for LocalObjectStore {
    fn upload(&self, local: &Path, object: &str) -> Result<()> {
        let dest = self.object_path(object)?;
        let data = fs::read(local).map_err(|e| BackupError::ReadFailed {
            path: local.to_path_buf(),
            source: e,
        })?;
        atomic::write_atomic(&dest, &data)?;
        Ok(())
    }

    fn download(&self, object: &str, local: &Path) -> Result<()> {
        let src = self.object_path(object)?;
        let data = fs::read(&src).map_err(|e| BackupError::StorageFailed {
            reason: format!("Object '{object}' not available in {}: {e}", self.describe()),
        })?;
        atomic::write_atomic(local, &data)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.bucket_dir.display().to_string()
    }
}
