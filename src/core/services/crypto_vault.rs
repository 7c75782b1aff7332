use std::path::{Path, PathBuf};

use crate::adapters::fs::atomic;
use crate::core::errors::{BackupError, Result};
use crate::core::models::backup_record::{decrypted_path_for, encrypted_path_for};
use crate::core::models::secret_key::SecretKey;
use crate::core::traits::cipher::CipherBackend;
use crate::core::traits::key_store::KeyStore;

/// Orchestrates file encrypt/decrypt operations by combining a
/// `CipherBackend` with a `KeyStore`.
pub struct CryptoVault<C: CipherBackend, K: KeyStore> {
    pub cipher: C,
    pub key_store: K,
}

impl<C: CipherBackend, K: KeyStore> CryptoVault<C, K> {
    pub fn new(cipher: C, key_store: K) -> Self {
        Self { cipher, key_store }
    }

    /// Load the key, generating it on first use.
    pub fn ensure_key(&self) -> Result<SecretKey> {
        self.key_store.load_or_create()
    }

    /// Encrypt `input` to `<input>.enc` and return that path.
    ///
    /// The output appears only once fully written.
    pub fn encrypt_file(&self, input: &Path) -> Result<PathBuf> {
        let key = self.ensure_key()?;
        let plaintext = read_input(input)?;
        let sealed = self.cipher.seal(&key, &plaintext)?;

        let output = encrypted_path_for(input);
        atomic::write_atomic(&output, &sealed)?;

        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            cipher = self.cipher.name(),
            "encrypted"
        );
        Ok(output)
    }

    /// Decrypt `encrypted` (which must end in `.enc`) next to itself with
    /// the suffix stripped, and return the plaintext path.
    ///
    /// Requires the key to exist already. Tampered, truncated or
    /// foreign-key input fails with `AuthenticationFailed` and writes nothing.
    pub fn decrypt_file(&self, encrypted: &Path) -> Result<PathBuf> {
        let output = decrypted_path_for(encrypted).ok_or_else(|| BackupError::NotEncrypted {
            path: encrypted.to_path_buf(),
        })?;
        self.decrypt_to(encrypted, &output)?;
        Ok(output)
    }

    /// Decrypt `encrypted` into `output`.
    pub fn decrypt_to(&self, encrypted: &Path, output: &Path) -> Result<()> {
        let key = self.key_store.load()?;
        let ciphertext = read_input(encrypted)?;

        let plaintext = self.cipher.open(&key, &ciphertext).map_err(|e| match e {
            BackupError::AuthenticationFailed { .. } => BackupError::AuthenticationFailed {
                path: encrypted.to_path_buf(),
            },
            other => other,
        })?;

        atomic::write_atomic(output, &plaintext)?;
        tracing::info!(
            input = %encrypted.display(),
            output = %output.display(),
            "decrypted"
        );
        Ok(())
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => BackupError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => BackupError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cipher::xchacha_backend::XChaChaBackend;
    use crate::adapters::key_stores::file_key_store::FileKeyStore;
    use std::fs;

    fn vault(dir: &Path) -> CryptoVault<XChaChaBackend, FileKeyStore> {
        CryptoVault::new(
            XChaChaBackend::new(),
            FileKeyStore::new(dir.join("secret.key")),
        )
    }

    #[test]
    fn encrypt_then_decrypt_restores_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let vault = vault(dir.path());
        let input = dir.path().join("archive.tar.zst");
        let content: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();
        fs::write(&input, &content).unwrap();

        let encrypted = vault.encrypt_file(&input).unwrap();
        assert_eq!(encrypted, dir.path().join("archive.tar.zst.enc"));
        assert!(dir.path().join("secret.key").exists());
        assert_ne!(fs::read(&encrypted).unwrap(), content);

        fs::remove_file(&input).unwrap();
        let decrypted = vault.decrypt_file(&encrypted).unwrap();
        assert_eq!(decrypted, input);
        assert_eq!(fs::read(&decrypted).unwrap(), content);
    }

    #[test]
    fn key_is_reused_across_calls() {
        let dir = tempfile::tempdir().unwrap();
        let vault = vault(dir.path());
        fs::write(dir.path().join("a"), "a").unwrap();
        fs::write(dir.path().join("b"), "b").unwrap();

        vault.encrypt_file(&dir.path().join("a")).unwrap();
        let key_after_first = fs::read(dir.path().join("secret.key")).unwrap();
        vault.encrypt_file(&dir.path().join("b")).unwrap();
        let key_after_second = fs::read(dir.path().join("secret.key")).unwrap();

        assert_eq!(key_after_first, key_after_second);
    }

    #[test]
    fn decrypt_without_key_is_key_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let encrypted = dir.path().join("x.tar.zst.enc");
        fs::write(&encrypted, b"whatever").unwrap();

        let result = vault(dir.path()).decrypt_file(&encrypted);
        assert!(matches!(result, Err(BackupError::KeyNotFound { .. })));
        assert!(!dir.path().join("x.tar.zst").exists());
    }

    #[test]
    fn tampered_artifact_fails_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let vault = vault(dir.path());
        let input = dir.path().join("data.bin");
        fs::write(&input, b"precious bytes").unwrap();
        let encrypted = vault.encrypt_file(&input).unwrap();
        fs::remove_file(&input).unwrap();

        let mut bytes = fs::read(&encrypted).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        fs::write(&encrypted, &bytes).unwrap();

        match vault.decrypt_file(&encrypted) {
            Err(BackupError::AuthenticationFailed { path }) => assert_eq!(path, encrypted),
            other => panic!("expected AuthenticationFailed, got {other:?}"),
        }
        assert!(!input.exists());
    }

    #[test]
    fn artifact_from_another_key_fails_authentication() {
        let dir = tempfile::tempdir().unwrap();
        let first = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.bin");
        fs::write(&input, b"bytes").unwrap();
        let encrypted = vault(first.path()).encrypt_file(&input).unwrap();

        let other = vault(dir.path());
        other.ensure_key().unwrap();
        let result = other.decrypt_file(&encrypted);
        assert!(matches!(result, Err(BackupError::AuthenticationFailed { .. })));
    }

    #[test]
    fn decrypt_requires_enc_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let vault = vault(dir.path());
        vault.ensure_key().unwrap();
        let plain = dir.path().join("archive.tar.zst");
        fs::write(&plain, b"x").unwrap();

        let result = vault.decrypt_file(&plain);
        assert!(matches!(result, Err(BackupError::NotEncrypted { .. })));
    }

    #[test]
    fn encrypt_missing_input_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = vault(dir.path()).encrypt_file(&dir.path().join("nope"));
        assert!(matches!(result, Err(BackupError::FileNotFound { .. })));
    }
}
