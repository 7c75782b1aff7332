use std::path::PathBuf;

use chacha20poly1305::{
    Key, XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, Payload},
};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::core::errors::{BackupError, Result};
use crate::core::models::secret_key::SecretKey;
use crate::core::traits::cipher::CipherBackend;

/// Format marker and version of encrypted artifacts.
pub const MAGIC: &[u8; 4] = b"ABK\x01";

pub const NONCE_SIZE: usize = 24;
pub const TAG_SIZE: usize = 16;

/// XChaCha20-Poly1305 backend.
///
/// Artifact layout:
/// ```text
/// [4 bytes: MAGIC][24 bytes: random nonce][N bytes: ciphertext][16 bytes: Poly1305 tag]
/// AAD = MAGIC
/// ```
///
/// A fresh 192-bit nonce is drawn from the OS RNG on every seal.
#[derive(Debug, Default, Clone)]
pub struct XChaChaBackend;

impl XChaChaBackend {
    pub fn new() -> Self {
        Self
    }
}

/// The vault fills in the artifact path.
fn auth_failed() -> BackupError {
    BackupError::AuthenticationFailed {
        path: PathBuf::new(),
    }
}

impl CipherBackend for XChaChaBackend {
    fn seal(&self, key: &SecretKey, plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = XNonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext,
                    aad: MAGIC,
                },
            )
            .map_err(|e| BackupError::EncryptionFailed {
                reason: format!("AEAD seal failed: {e}"),
            })?;

        let mut out = Vec::with_capacity(MAGIC.len() + NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn open(&self, key: &SecretKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < MAGIC.len() + NONCE_SIZE + TAG_SIZE {
            return Err(auth_failed());
        }

        let (header, rest) = ciphertext.split_at(MAGIC.len());
        if header != MAGIC {
            return Err(auth_failed());
        }
        let (nonce_bytes, body) = rest.split_at(NONCE_SIZE);

        let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
        cipher
            .decrypt(
                XNonce::from_slice(nonce_bytes),
                Payload {
                    msg: body,
                    aad: MAGIC,
                },
            )
            .map_err(|_| auth_failed())
    }

    fn name(&self) -> &str {
        "xchacha20poly1305"
    }
}
