use crate::core::errors::Result;
use crate::core::models::backup_record::BackupRecord;

/// Port for recording and listing completed backups.
pub trait BackupHistory: Send + Sync {
    /// Append a record to the history.
    fn append(&self, record: &BackupRecord) -> Result<()>;

    /// All records, oldest first.
    fn list(&self) -> Result<Vec<BackupRecord>>;
}
