use std::path::{Path, PathBuf};

use crate::core::errors::Result;

/// Port for bundling files into a single compressed archive.
pub trait Archiver: Send + Sync {
    /// File extension of produced archives, without a leading dot.
    fn extension(&self) -> &str;

    /// Write `files` (all located under `root`) into a new archive at
    /// `output`. Returns the files actually archived, in archive order.
    /// Must not replace an existing file at `output`.
    fn create(&self, root: &Path, files: &[PathBuf], output: &Path) -> Result<Vec<PathBuf>>;

    /// Unpack every entry of `archive` into `destination`.
    fn extract(&self, archive: &Path, destination: &Path) -> Result<()>;
}
