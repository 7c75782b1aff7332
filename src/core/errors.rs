use std::path::PathBuf;

/// All domain errors for AutoBackup.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error(
        "Directory not found: {path}\n\n  \
         Check that the path is correct and points to a directory."
    )]
    DirectoryNotFound { path: PathBuf },

    #[error(
        "File not found: {path}\n\n  \
         Check that the path is correct and the file exists.\n  \
         Run 'autobackup history' to list known backups."
    )]
    FileNotFound { path: PathBuf },

    #[error("Cannot read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {file}: {detail}")]
    ParseError { file: PathBuf, detail: String },

    #[error(
        "Encryption key not found at {path}\n\n  \
         Decryption needs the exact key that encrypted the backup.\n  \
         Restore the key file from your own safekeeping, or pass --key-file."
    )]
    KeyNotFound { path: PathBuf },

    #[error(
        "Invalid key file {path}: {detail}\n\n  \
         The key file must contain exactly 32 raw bytes."
    )]
    InvalidKey { path: PathBuf, detail: String },

    #[error(
        "Authentication failed for {path}\n\n  \
         The encrypted file is corrupted, was tampered with,\n  \
         or was encrypted with a different key. Nothing was written."
    )]
    AuthenticationFailed { path: PathBuf },

    #[error("Not an encrypted backup (expected a .enc suffix): {path}")]
    NotEncrypted { path: PathBuf },

    #[error("Encryption failed: {reason}")]
    EncryptionFailed { reason: String },

    #[error("Archive error: {reason}")]
    ArchiveFailed { reason: String },

    #[error("Remote storage error: {reason}")]
    StorageFailed { reason: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "Another autobackup run holds the lock {lock}\n\n  \
         Wait for it to finish. If no other run is active,\n  \
         the lock is stale and can be deleted."
    )]
    AlreadyRunning { lock: PathBuf },

    #[error(
        "{count} file(s) changed since the manifest was written\n\n  \
         Restore the listed files from a backup if the change was unexpected."
    )]
    IntegrityDrift { count: usize },

    #[error(
        "Cannot record {path} in a manifest\n\n  \
         Manifest keys must be valid UTF-8. Rename the file or exclude its directory."
    )]
    NonUtf8Path { path: PathBuf },

    #[error("Cannot encode manifest: {detail}")]
    ManifestEncode { detail: String },

    #[error("Backup history error: {detail}")]
    HistoryError { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BackupError>;
