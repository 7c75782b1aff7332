use std::path::{Path, PathBuf};

use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::adapters::fs::atomic;
use crate::core::errors::{BackupError, Result};
use crate::core::models::secret_key::{KEY_SIZE, SecretKey};
use crate::core::traits::key_store::KeyStore;

/// Default key file location, relative to the working directory.
pub const DEFAULT_KEY_FILE: &str = "secret.key";

/// File-based key store holding the raw 32 key bytes.
///
/// The file is created once, owner-only on Unix, and never rewritten.
/// Losing it makes every existing `.enc` artifact unrecoverable.
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    path: PathBuf,
}

impl FileKeyStore {
    /// Create a key store backed by the given file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_key(&self) -> Result<SecretKey> {
        let bytes = std::fs::read(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BackupError::KeyNotFound {
                path: self.path.clone(),
            },
            _ => BackupError::ReadFailed {
                path: self.path.clone(),
                source: e,
            },
        })?;

        SecretKey::from_slice(&bytes).ok_or_else(|| BackupError::InvalidKey {
            path: self.path.clone(),
            detail: format!("expected {KEY_SIZE} bytes, found {}", bytes.len()),
        })
    }
}

impl KeyStore for FileKeyStore {
    fn load(&self) -> Result<SecretKey> {
        self.read_key()
    }

    fn load_or_create(&self) -> Result<SecretKey> {
        if self.path.exists() {
            return self.read_key();
        }

        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        let key = SecretKey::from_bytes(bytes);
        bytes.zeroize();

        if atomic::write_new_private(&self.path, key.as_bytes())? {
            tracing::info!(path = %self.path.display(), "generated new backup key");
            Ok(key)
        } else {
            // Another writer created the key first; theirs is authoritative.
            self.read_key()
        }
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FileKeyStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyStore::new(dir.path().join("secret.key"));
        (dir, store)
    }

    #[test]
    fn load_missing_key_is_key_not_found() {
        let (_dir, store) = temp_store();
        assert!(!store.exists());
        assert!(matches!(store.load(), Err(BackupError::KeyNotFound { .. })));
    }

    #[test]
    fn load_or_create_generates_once() {
        let (_dir, store) = temp_store();

        let first = store.load_or_create().unwrap();
        assert!(store.exists());
        assert_eq!(std::fs::read(store.location()).unwrap().len(), KEY_SIZE);

        let second = store.load_or_create().unwrap();
        assert_eq!(first, second);
        assert_eq!(store.load().unwrap(), first);
    }

    #[test]
    fn existing_key_file_is_used_verbatim() {
        let (_dir, store) = temp_store();
        std::fs::write(store.location(), [5u8; KEY_SIZE]).unwrap();

        let key = store.load_or_create().unwrap();
        assert_eq!(key.as_bytes(), &[5u8; KEY_SIZE]);
    }

    #[test]
    fn wrong_length_is_invalid_key() {
        let (_dir, store) = temp_store();
        std::fs::write(store.location(), b"too short").unwrap();

        assert!(matches!(store.load(), Err(BackupError::InvalidKey { .. })));
        assert!(matches!(
            store.load_or_create(),
            Err(BackupError::InvalidKey { .. })
        ));
    }
}
