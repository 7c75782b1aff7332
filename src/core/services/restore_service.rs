use std::fs;
use std::path::{Path, PathBuf};

use crate::adapters::fs::lock::InstanceLock;
use crate::core::errors::{BackupError, Result};
use crate::core::models::backup_record::decrypted_path_for;
use crate::core::services::crypto_vault::CryptoVault;
use crate::core::traits::archiver::Archiver;
use crate::core::traits::cipher::CipherBackend;
use crate::core::traits::key_store::KeyStore;
use crate::core::traits::object_store::ObjectStore;

/// Knobs for restores, resolved from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreSettings {
    /// Downloads land here before decryption.
    pub staging_dir: PathBuf,
    /// Keep decrypted archives after extraction.
    pub keep_plaintext: bool,
}

/// What a restore extracted, and from where.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreReport {
    pub archive: PathBuf,
    pub destination: PathBuf,
}

/// Drives a restore: (download →) decrypt → extract.
pub struct RestoreService<C: CipherBackend, K: KeyStore, A: Archiver> {
    pub vault: CryptoVault<C, K>,
    pub archiver: A,
    pub settings: RestoreSettings,
}

impl<C: CipherBackend, K: KeyStore, A: Archiver> RestoreService<C, K, A> {
    /// Extract `backup_file` into `destination`, creating it if needed.
    ///
    /// Encrypted artifacts (`.enc`) are decrypted first; plain archives
    /// are extracted as they are.
    pub fn run_restore(&self, backup_file: &Path, destination: &Path) -> Result<RestoreReport> {
        if !backup_file.is_file() {
            return Err(BackupError::FileNotFound {
                path: backup_file.to_path_buf(),
            });
        }
        tracing::info!(
            backup = %backup_file.display(),
            destination = %destination.display(),
            "starting restore"
        );

        if decrypted_path_for(backup_file).is_some() {
            let _lock = InstanceLock::acquire(self.vault.key_store.location())?;
            self.decrypt_and_extract(backup_file, destination)
        } else {
            self.extract(backup_file, destination)
        }
    }

    /// Download `object` from `store`, decrypt it, and extract it into
    /// `destination`.
    ///
    /// A decryption failure is returned before anything is extracted.
    pub fn run_remote_restore(
        &self,
        store: &dyn ObjectStore,
        object: &str,
        destination: &Path,
    ) -> Result<RestoreReport> {
        let _lock = InstanceLock::acquire(self.vault.key_store.location())?;

        let local = self.settings.staging_dir.join(object);
        if decrypted_path_for(&local).is_none() {
            return Err(BackupError::NotEncrypted { path: local });
        }
        fs::create_dir_all(&self.settings.staging_dir)?;

        tracing::info!(object, remote = %store.describe(), "downloading");
        store.download(object, &local)?;
        tracing::info!(object, local = %local.display(), "download completed");

        self.decrypt_and_extract(&local, destination)
    }

    fn decrypt_and_extract(&self, encrypted: &Path, destination: &Path) -> Result<RestoreReport> {
        let archive = self.vault.decrypt_file(encrypted)?;
        let result = self.extract(&archive, destination);

        if !self.settings.keep_plaintext {
            if let Err(e) = fs::remove_file(&archive) {
                tracing::warn!(archive = %archive.display(), error = %e, "could not remove decrypted archive");
            }
        }
        result
    }

    fn extract(&self, archive: &Path, destination: &Path) -> Result<RestoreReport> {
        self.archiver.extract(archive, destination)?;
        tracing::info!(
            archive = %archive.display(),
            destination = %destination.display(),
            "restore completed"
        );
        Ok(RestoreReport {
            archive: archive.to_path_buf(),
            destination: destination.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::archive::tar_zstd::TarZstdArchiver;
    use crate::adapters::cipher::xchacha_backend::XChaChaBackend;
    use crate::adapters::key_stores::file_key_store::FileKeyStore;
    use crate::adapters::storage::local_store::LocalObjectStore;

    type Service = RestoreService<XChaChaBackend, FileKeyStore, TarZstdArchiver>;

    fn service(work: &Path) -> Service {
        RestoreService {
            vault: CryptoVault::new(
                XChaChaBackend::new(),
                FileKeyStore::new(work.join("secret.key")),
            ),
            archiver: TarZstdArchiver::new(),
            settings: RestoreSettings {
                staging_dir: work.join("backups"),
                keep_plaintext: false,
            },
        }
    }

    /// Archive `docs/a.txt` and encrypt it. Returns (archive, encrypted).
    fn make_backup(work: &Path, svc: &Service) -> (PathBuf, PathBuf) {
        let src = work.join("docs");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.txt"), "alpha").unwrap();

        let archive = work.join("snap.tar.zst");
        svc.archiver
            .create(&src, &[src.join("a.txt")], &archive)
            .unwrap();
        let encrypted = svc.vault.encrypt_file(&archive).unwrap();
        (archive, encrypted)
    }

    #[test]
    fn restores_plain_archive() {
        let work = tempfile::tempdir().unwrap();
        let svc = service(work.path());
        let (archive, _) = make_backup(work.path(), &svc);

        let dest = work.path().join("restored");
        svc.run_restore(&archive, &dest).unwrap();
        assert_eq!(fs::read_to_string(dest.join("docs/a.txt")).unwrap(), "alpha");
        assert!(archive.exists());
    }

    #[test]
    fn restores_encrypted_artifact_and_drops_plaintext() {
        let work = tempfile::tempdir().unwrap();
        let svc = service(work.path());
        let (archive, encrypted) = make_backup(work.path(), &svc);
        fs::remove_file(&archive).unwrap();

        let dest = work.path().join("restored");
        let report = svc.run_restore(&encrypted, &dest).unwrap();
        assert_eq!(report.archive, archive);
        assert_eq!(fs::read_to_string(dest.join("docs/a.txt")).unwrap(), "alpha");
        assert!(!archive.exists());
    }

    #[test]
    fn missing_backup_is_file_not_found() {
        let work = tempfile::tempdir().unwrap();
        let result = service(work.path()).run_restore(&work.path().join("nope.enc"), work.path());
        assert!(matches!(result, Err(BackupError::FileNotFound { .. })));
    }

    #[test]
    fn remote_restore_downloads_decrypts_and_extracts() {
        let work = tempfile::tempdir().unwrap();
        let svc = service(work.path());
        let (_, encrypted) = make_backup(work.path(), &svc);
        let store = LocalObjectStore::new(&work.path().join("remote"), "bucket").unwrap();
        store.upload(&encrypted, "snap.tar.zst.enc").unwrap();

        let dest = work.path().join("restored");
        svc.run_remote_restore(&store, "snap.tar.zst.enc", &dest).unwrap();

        assert_eq!(fs::read_to_string(dest.join("docs/a.txt")).unwrap(), "alpha");
        assert!(work.path().join("backups/snap.tar.zst.enc").exists());
        assert!(!work.path().join("backups/snap.tar.zst").exists());
    }

    #[test]
    fn remote_restore_with_tampered_object_extracts_nothing() {
        let work = tempfile::tempdir().unwrap();
        let svc = service(work.path());
        let (_, encrypted) = make_backup(work.path(), &svc);
        let mut bytes = fs::read(&encrypted).unwrap();
        bytes[10] ^= 0xFF;
        let bucket = work.path().join("remote/bucket");
        fs::create_dir_all(&bucket).unwrap();
        fs::write(bucket.join("snap.tar.zst.enc"), &bytes).unwrap();
        let store = LocalObjectStore::new(&work.path().join("remote"), "bucket").unwrap();

        let dest = work.path().join("restored");
        let result = svc.run_remote_restore(&store, "snap.tar.zst.enc", &dest);

        assert!(matches!(result, Err(BackupError::AuthenticationFailed { .. })));
        assert!(!dest.exists());
    }

    #[test]
    fn remote_restore_without_key_is_key_not_found() {
        let work = tempfile::tempdir().unwrap();
        let bucket = work.path().join("remote/bucket");
        fs::create_dir_all(&bucket).unwrap();
        fs::write(bucket.join("x.tar.zst.enc"), b"opaque").unwrap();
        let store = LocalObjectStore::new(&work.path().join("remote"), "bucket").unwrap();

        let result =
            service(work.path()).run_remote_restore(&store, "x.tar.zst.enc", &work.path().join("d"));
        assert!(matches!(result, Err(BackupError::KeyNotFound { .. })));
    }
}
