use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::core::errors::{BackupError, Result};
use crate::core::models::backup_record::BackupRecord;
use crate::core::traits::history::BackupHistory;

/// File name of the history journal inside the backup directory.
pub const HISTORY_FILE: &str = "history.jsonl";

/// Backup history that appends records as JSON lines to a file.
///
/// Each line is a self-contained JSON object representing one
/// `BackupRecord`. This format supports cheap appends and
/// line-by-line streaming reads.
pub struct JsonHistoryLog {
    log_path: PathBuf,
}

impl JsonHistoryLog {
    /// Create a history log at `{backup_dir}/history.jsonl`.
    pub fn new(backup_dir: &Path) -> Self {
        Self {
            log_path: backup_dir.join(HISTORY_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

impl BackupHistory for JsonHistoryLog {
    fn append(&self, record: &BackupRecord) -> Result<()> {
        let line = serde_json::to_string(record).map_err(|e| BackupError::HistoryError {
            detail: format!("Failed to serialize backup record: {e}"),
        })?;

        if let Some(parent) = self.log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| BackupError::HistoryError {
                detail: format!("Cannot open history at {}: {e}", self.log_path.display()),
            })?;

        writeln!(file, "{line}").map_err(|e| BackupError::HistoryError {
            detail: format!("Failed to write history entry: {e}"),
        })?;

        Ok(())
    }

    fn list(&self) -> Result<Vec<BackupRecord>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.log_path).map_err(|e| BackupError::HistoryError {
            detail: format!("Cannot read history: {e}"),
        })?;

        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| BackupError::HistoryError {
                detail: format!("Error reading history line {}: {e}", line_num + 1),
            })?;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let record: BackupRecord =
                serde_json::from_str(trimmed).map_err(|e| BackupError::HistoryError {
                    detail: format!("Malformed history entry at line {}: {e}", line_num + 1),
                })?;
            records.push(record);
        }

        Ok(records)
    }
}
