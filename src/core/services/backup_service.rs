use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::Local;

use crate::adapters::fs::lock::InstanceLock;
use crate::adapters::fs::selector::select_modified_files;
use crate::core::errors::{BackupError, Result};
use crate::core::models::backup_record::{
    BackupOutcome, BackupRecord, ENCRYPTED_SUFFIX, decrypted_path_for,
};
use crate::core::services::crypto_vault::CryptoVault;
use crate::core::services::manifest_service::ManifestService;
use crate::core::traits::archiver::Archiver;
use crate::core::traits::cipher::CipherBackend;
use crate::core::traits::history::BackupHistory;
use crate::core::traits::key_store::KeyStore;
use crate::core::traits::object_store::ObjectStore;

/// Knobs for a backup run, resolved from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupSettings {
    /// Where archives, manifests and encrypted artifacts are written.
    pub backup_dir: PathBuf,
    /// Files modified within this many days are selected.
    pub window_days: u32,
    /// Keep the plaintext archive after it has been encrypted.
    pub keep_plaintext: bool,
    /// Extra paths never selected for backup (e.g. the log file). The
    /// backup directory, key file and its lock are always excluded.
    pub exclude: Vec<PathBuf>,
}

/// Drives a backup: select → archive → manifest → encrypt → record.
pub struct BackupService<C: CipherBackend, K: KeyStore, A: Archiver, H: BackupHistory> {
    pub vault: CryptoVault<C, K>,
    pub archiver: A,
    pub history: H,
    pub settings: BackupSettings,
}

impl<C, K, A, H> BackupService<C, K, A, H>
where
    C: CipherBackend,
    K: KeyStore,
    A: Archiver,
    H: BackupHistory,
{
    /// Back up files under `target_dir` changed within the recency window.
    ///
    /// Returns `NothingToDo` without touching the filesystem when no file
    /// qualifies. On failure the plaintext archive and manifest of this run
    /// are removed; the encrypted artifact only ever appears complete.
    pub fn run_backup(&self, target_dir: &Path) -> Result<BackupOutcome> {
        if !target_dir.is_dir() {
            return Err(BackupError::DirectoryNotFound {
                path: target_dir.to_path_buf(),
            });
        }
        let root = target_dir.canonicalize()?;
        tracing::info!(source_dir = %root.display(), "starting backup");

        let files =
            select_modified_files(&root, self.settings.window_days, &self.excluded_paths())?;
        if files.is_empty() {
            tracing::info!(
                source_dir = %root.display(),
                window_days = self.settings.window_days,
                "no recently modified files to back up"
            );
            return Ok(BackupOutcome::NothingToDo);
        }

        let _lock = InstanceLock::acquire(self.vault.key_store.location())?;
        fs::create_dir_all(&self.settings.backup_dir)?;

        let mut record = self.plan_unique(&root);

        let archived = self.archiver.create(&root, &files, &record.archive_path)?;
        record.file_count = archived.len();
        tracing::info!(
            archive = %record.archive_path.display(),
            files = record.file_count,
            "archive created"
        );

        if let Err(e) = self.seal(&archived, &record) {
            self.discard_partial(&record);
            return Err(e);
        }

        record.plaintext_retained =
            self.settings.keep_plaintext || !remove_plaintext(&record.archive_path);

        if let Err(e) = self.history.append(&record) {
            tracing::warn!(error = %e, "backup succeeded but history was not updated");
        }

        tracing::info!(artifact = %record.encrypted_path.display(), "backup completed");
        Ok(BackupOutcome::Completed(record))
    }

    /// Paths inside the backup root that belong to the tool itself.
    fn excluded_paths(&self) -> Vec<PathBuf> {
        let key = self.vault.key_store.location();
        let mut exclude = vec![
            self.settings.backup_dir.clone(),
            key.to_path_buf(),
            InstanceLock::path_for(key),
        ];
        exclude.extend(self.settings.exclude.iter().cloned());
        exclude
    }

    /// Artifact names for this run that no earlier run has used. Must be
    /// called with the instance lock held.
    fn plan_unique(&self, root: &Path) -> BackupRecord {
        let timestamp = Local::now();
        let mut sequence = 0;
        loop {
            let record = BackupRecord::plan(
                &self.settings.backup_dir,
                root,
                timestamp,
                self.archiver.extension(),
                sequence,
            );
            if !record.collides() {
                return record;
            }
            tracing::debug!(sequence, "artifact name taken, trying next");
            sequence += 1;
        }
    }

    /// Manifest over exactly the archived files, then encrypt the archive.
    fn seal(&self, archived: &[PathBuf], record: &BackupRecord) -> Result<()> {
        ManifestService.build_and_save(archived, &record.manifest_path)?;
        let encrypted = self.vault.encrypt_file(&record.archive_path)?;
        debug_assert_eq!(encrypted, record.encrypted_path);
        Ok(())
    }

    fn discard_partial(&self, record: &BackupRecord) {
        for path in [&record.archive_path, &record.manifest_path] {
            if path.exists() {
                if let Err(e) = fs::remove_file(path) {
                    tracing::warn!(path = %path.display(), error = %e, "could not clean up");
                }
            }
        }
    }

    /// Most recently modified encrypted artifact in the backup directory.
    pub fn latest_artifact(&self) -> Result<PathBuf> {
        let dir = &self.settings.backup_dir;
        let not_found = || BackupError::FileNotFound {
            path: dir.join(format!("*{ENCRYPTED_SUFFIX}")),
        };
        if !dir.is_dir() {
            return Err(not_found());
        }

        let mut latest: Option<(SystemTime, PathBuf)> = None;
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if decrypted_path_for(&path).is_none() || !entry.file_type()?.is_file() {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            let newer = latest.as_ref().is_none_or(|(best, _)| modified >= *best);
            if newer {
                latest = Some((modified, path));
            }
        }

        latest.map(|(_, path)| path).ok_or_else(not_found)
    }

    /// Upload an encrypted artifact under its file name and return that name.
    ///
    /// Refuses anything without the `.enc` suffix so plaintext never
    /// leaves the machine.
    pub fn push_artifact(&self, store: &dyn ObjectStore, artifact: &Path) -> Result<String> {
        if !artifact.is_file() {
            return Err(BackupError::FileNotFound {
                path: artifact.to_path_buf(),
            });
        }
        if decrypted_path_for(artifact).is_none() {
            return Err(BackupError::NotEncrypted {
                path: artifact.to_path_buf(),
            });
        }
        let object = artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| BackupError::NotEncrypted {
                path: artifact.to_path_buf(),
            })?;

        tracing::info!(
            artifact = %artifact.display(),
            remote = %store.describe(),
            "uploading"
        );
        store.upload(artifact, &object)?;
        tracing::info!(object = %object, remote = %store.describe(), "upload completed");
        Ok(object)
    }
}

/// Delete the plaintext archive once its encrypted copy exists. The backup
/// has already succeeded, so a failure is only logged; returns whether the
/// archive is gone.
fn remove_plaintext(archive: &Path) -> bool {
    match fs::remove_file(archive) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                archive = %archive.display(),
                error = %e,
                "could not remove plaintext archive"
            );
            false
        }
    }
}
