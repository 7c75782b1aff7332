use std::path::Path;

use crate::core::errors::Result;
use crate::core::models::secret_key::SecretKey;

/// Port for persisting the single backup key.
pub trait KeyStore: Send + Sync {
    /// Load the key, or fail with `BackupError::KeyNotFound` if it was
    /// never created.
    fn load(&self) -> Result<SecretKey>;

    /// Load the key, generating and persisting a new one on first use.
    fn load_or_create(&self) -> Result<SecretKey>;

    /// Whether a key has been persisted.
    fn exists(&self) -> bool;

    /// Location of the key, for messages and lock placement.
    fn location(&self) -> &Path;
}
