use crate::core::errors::Result;
use crate::core::models::secret_key::SecretKey;

/// Port for authenticated symmetric encryption backends.
///
/// Implementations live in `adapters::cipher`. The core layer only
/// depends on this trait, never on a concrete AEAD construction.
pub trait CipherBackend: Send + Sync {
    /// Encrypt `plaintext` under `key`. The output must carry everything
    /// besides the key that `open` needs (nonce, tag, format header).
    fn seal(&self, key: &SecretKey, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Authenticate and decrypt. Any tampering, truncation or wrong key
    /// must fail with `BackupError::AuthenticationFailed`.
    fn open(&self, key: &SecretKey, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// Human-readable name of this backend (e.g. "xchacha20poly1305").
    fn name(&self) -> &str;
}
