use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::adapters::fs::atomic;
use crate::core::errors::{BackupError, Result};
use crate::core::traits::archiver::Archiver;

/// zstd level used for new archives.
const COMPRESSION_LEVEL: i32 = 3;

/// Tar stream compressed with zstd (`.tar.zst`).
///
/// Entry names are relative to the parent of the backup root, so a backup
/// of `/home/me/docs` restores as `<dest>/docs/...`.
#[derive(Debug, Default, Clone)]
pub struct TarZstdArchiver;

impl TarZstdArchiver {
    pub fn new() -> Self {
        Self
    }

    fn entry_name<'a>(base: &Path, file: &'a Path) -> Result<&'a Path> {
        file.strip_prefix(base)
            .map_err(|_| BackupError::ArchiveFailed {
                reason: format!(
                    "{} is outside the backup root {}",
                    file.display(),
                    base.display()
                ),
            })
    }
}

impl Archiver for TarZstdArchiver {
    fn extension(&self) -> &str {
        "tar.zst"
    }

    fn create(&self, root: &Path, files: &[PathBuf], output: &Path) -> Result<Vec<PathBuf>> {
        let base = root.parent().unwrap_or(root);
        let mut tmp = atomic::temp_sibling(output)?;

        {
            let encoder = zstd::Encoder::new(tmp.as_file_mut(), COMPRESSION_LEVEL)?;
            let mut builder = tar::Builder::new(encoder);

            for file in files {
                let name = Self::entry_name(base, file)?;
                builder
                    .append_path_with_name(file, name)
                    .map_err(|e| BackupError::ReadFailed {
                        path: file.clone(),
                        source: e,
                    })?;
                tracing::debug!(file = %file.display(), "archived");
            }

            builder.into_inner()?.finish()?;
        }
        tmp.as_file_mut().sync_all()?;

        tmp.persist_noclobber(output).map_err(|e| match e.error.kind() {
            io::ErrorKind::AlreadyExists => BackupError::ArchiveFailed {
                reason: format!("{} already exists", output.display()),
            },
            _ => BackupError::Io(e.error),
        })?;

        Ok(files.to_vec())
    }

    fn extract(&self, archive: &Path, destination: &Path) -> Result<()> {
        let file = File::open(archive).map_err(|e| BackupError::ReadFailed {
            path: archive.to_path_buf(),
            source: e,
        })?;
        fs::create_dir_all(destination)?;

        let decoder = zstd::Decoder::new(file)?;
        let mut tar = tar::Archive::new(decoder);
        tar.unpack(destination)
            .map_err(|e| BackupError::ArchiveFailed {
                reason: format!("Cannot extract {}: {e}", archive.display()),
            })
    }
}
