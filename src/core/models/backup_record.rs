use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// File name stamp format: `YYYYMMDD-HHMMSS`.
pub const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Suffix appended to an archive name to form the encrypted artifact name.
pub const ENCRYPTED_SUFFIX: &str = ".enc";

/// Suffix of the manifest written next to each archive.
pub const MANIFEST_SUFFIX: &str = "_hash_manifest.json";

/// Everything one backup run produced, threaded through the pipeline
/// and appended to the backup history (JSON lines format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub timestamp: DateTime<Local>,
    pub source_dir: PathBuf,
    pub archive_path: PathBuf,
    pub manifest_path: PathBuf,
    pub encrypted_path: PathBuf,
    pub file_count: usize,
    /// Whether the plaintext archive was kept next to the encrypted one.
    pub plaintext_retained: bool,
}

impl BackupRecord {
    /// Lay out the artifact paths for a run started at `timestamp`.
    ///
    /// `archive_extension` has no leading dot (e.g. `tar.zst`). A non-zero
    /// `sequence` disambiguates runs within the same second:
    /// `<stamp>-<sequence>_backup.<ext>`.
    pub fn plan(
        backup_dir: &Path,
        source_dir: &Path,
        timestamp: DateTime<Local>,
        archive_extension: &str,
        sequence: u32,
    ) -> Self {
        let stamp = timestamp.format(STAMP_FORMAT);
        let base = match sequence {
            0 => format!("{stamp}_backup"),
            n => format!("{stamp}-{n}_backup"),
        };
        let archive_path = backup_dir.join(format!("{base}.{archive_extension}"));
        let manifest_path = backup_dir.join(format!("{base}{MANIFEST_SUFFIX}"));
        let encrypted_path = encrypted_path_for(&archive_path);

        Self {
            timestamp,
            source_dir: source_dir.to_path_buf(),
            archive_path,
            manifest_path,
            encrypted_path,
            file_count: 0,
            plaintext_retained: true,
        }
    }

    /// Returns true if any artifact path of this record is already taken.
    pub fn collides(&self) -> bool {
        [&self.archive_path, &self.manifest_path, &self.encrypted_path]
            .iter()
            .any(|p| p.exists())
    }
}

/// Result of a backup request.
#[derive(Debug, Clone, PartialEq)]
pub enum BackupOutcome {
    /// No file changed inside the recency window; nothing was written.
    NothingToDo,
    Completed(BackupRecord),
}

/// `<path>.enc`
pub fn encrypted_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(ENCRYPTED_SUFFIX);
    PathBuf::from(name)
}

/// Strip the trailing `.enc` suffix. Returns `None` if the path does not
/// end with it or nothing would remain of the file name.
pub fn decrypted_path_for(path: &Path) -> Option<PathBuf> {
    let file_name = path.file_name()?.to_str()?;
    let stem = file_name.strip_suffix(ENCRYPTED_SUFFIX)?;
    if stem.is_empty() {
        return None;
    }
    Some(path.with_file_name(stem))
}
