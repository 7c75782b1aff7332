use std::path::PathBuf;
use std::time::Duration;

use crate::adapters::archive::tar_zstd::TarZstdArchiver;
use crate::adapters::cipher::xchacha_backend::XChaChaBackend;
use crate::adapters::history::json_history_log::JsonHistoryLog;
use crate::adapters::key_stores::file_key_store::FileKeyStore;
use crate::adapters::storage::gcs_store::GcsObjectStore;
use crate::adapters::storage::local_store::LocalObjectStore;
use crate::config::app_config::{AppConfig, BACKEND_LOCAL};
use crate::core::errors::{BackupError, Result};
use crate::core::services::backup_service::{BackupService, BackupSettings};
use crate::core::services::crypto_vault::CryptoVault;
use crate::core::services::restore_service::{RestoreService, RestoreSettings};
use crate::core::traits::object_store::ObjectStore;

pub type DefaultBackupService =
    BackupService<XChaChaBackend, FileKeyStore, TarZstdArchiver, JsonHistoryLog>;
pub type DefaultRestoreService = RestoreService<XChaChaBackend, FileKeyStore, TarZstdArchiver>;

/// Resolved settings for one invocation, passed to every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: AppConfig,
}

impl Context {
    /// Apply the global CLI overrides on top of the loaded config.
    pub fn new(mut config: AppConfig, backup_dir: Option<PathBuf>, key_file: Option<PathBuf>) -> Self {
        if let Some(dir) = backup_dir {
            config.backup.dir = dir;
        }
        if let Some(key) = key_file {
            config.crypto.key_file = key;
        }
        Self { config }
    }

    pub fn history(&self) -> JsonHistoryLog {
        JsonHistoryLog::new(&self.config.backup.dir)
    }

    fn vault(&self) -> CryptoVault<XChaChaBackend, FileKeyStore> {
        CryptoVault::new(
            XChaChaBackend::new(),
            FileKeyStore::new(self.config.crypto.key_file.clone()),
        )
    }

    /// Backup service with an optional recency window override.
    pub fn backup_service(&self, window_days: Option<u32>) -> Result<DefaultBackupService> {
        let window_days = window_days.unwrap_or(self.config.backup.window_days);
        if window_days == 0 {
            return Err(BackupError::InvalidConfig {
                detail: "--days must be at least 1".into(),
            });
        }
        Ok(BackupService {
            vault: self.vault(),
            archiver: TarZstdArchiver::new(),
            history: self.history(),
            settings: BackupSettings {
                backup_dir: self.config.backup.dir.clone(),
                window_days,
                keep_plaintext: self.config.backup.keep_plaintext,
                exclude: vec![self.config.logging.file.clone()],
            },
        })
    }

    pub fn restore_service(&self) -> DefaultRestoreService {
        RestoreService {
            vault: self.vault(),
            archiver: TarZstdArchiver::new(),
            settings: RestoreSettings {
                staging_dir: self.config.backup.dir.clone(),
                keep_plaintext: self.config.backup.keep_plaintext,
            },
        }
    }

    /// Build the configured object store. `bucket` overrides `remote.bucket`.
    pub fn object_store(&self, bucket: Option<&str>) -> Result<Box<dyn ObjectStore>> {
        let remote = &self.config.remote;
        let bucket = bucket
            .or(remote.bucket.as_deref())
            .ok_or_else(|| BackupError::InvalidConfig {
                detail: "No bucket configured. Set remote.bucket or pass --bucket.".into(),
            })?;

        if remote.backend == BACKEND_LOCAL {
            Ok(Box::new(LocalObjectStore::new(&remote.root, bucket)?))
        } else {
            Ok(Box::new(GcsObjectStore::from_env(
                &remote.endpoint,
                bucket,
                &remote.token_env,
                Duration::from_secs(remote.timeout_secs),
            )?))
        }
    }
}
