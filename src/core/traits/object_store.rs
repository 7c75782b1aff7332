use std::path::Path;

use crate::core::errors::Result;

/// Port for remote object storage holding encrypted artifacts.
pub trait ObjectStore: Send + Sync {
    /// Upload the file at `local` as `object`.
    fn upload(&self, local: &Path, object: &str) -> Result<()>;

    /// Download `object` to `local`, replacing any existing file.
    fn download(&self, object: &str, local: &Path) -> Result<()>;

    /// Human-readable location (e.g. "gs://bucket").
    fn describe(&self) -> String;
}
