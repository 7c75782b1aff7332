use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::core::errors::{BackupError, Result};

/// Read size for streaming file content into the hash.
pub const HASH_CHUNK_SIZE: usize = 4096;

/// Compute the lowercase hex SHA-256 digest of a file's content.
///
/// The file is streamed in `HASH_CHUNK_SIZE` chunks and never loaded
/// whole. Fails with `ReadFailed` if the file cannot be opened or read,
/// which includes files removed after they were selected.
pub fn hash_file(path: &Path) -> Result<String> {
    let read_failed = |source| BackupError::ReadFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(read_failed)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; HASH_CHUNK_SIZE];

    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_failed(e)),
        };
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
