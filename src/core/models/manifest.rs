use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::core::errors::{BackupError, Result};

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Ordered mapping of file path to content digest.
///
/// Serialized as a single JSON object whose key order is the
/// insertion order, so the same file list always produces the
/// same document.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: IndexMap<PathBuf, String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. A path already present has its digest replaced
    /// in place, keeping its original position.
    pub fn insert(&mut self, path: PathBuf, digest: String) {
        self.entries.insert(path, digest);
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.entries.iter().map(|(p, d)| (p.as_path(), d.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to a pretty-printed JSON object.
    ///
    /// Fails with `NonUtf8Path` rather than writing a key that would
    /// no longer name the file.
    pub fn to_json(&self) -> Result<String> {
        let mut map = Map::with_capacity(self.entries.len());
        for (path, digest) in &self.entries {
            let key = path
                .to_str()
                .ok_or_else(|| BackupError::NonUtf8Path { path: path.clone() })?;
            map.insert(key.to_owned(), Value::String(digest.clone()));
        }
        serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| BackupError::ManifestEncode { detail: e.to_string() })
    }

    /// Parse a manifest document. `source` is only used in error messages.
    ///
    /// The document must be a JSON object whose values are all
    /// 64-character hex digests.
    pub fn from_json(content: &str, source: &Path) -> Result<Self> {
        let parse_error = |detail: String| BackupError::ParseError {
            file: source.to_path_buf(),
            detail,
        };

        let value: Value =
            serde_json::from_str(content).map_err(|e| parse_error(format!("invalid JSON: {e}")))?;

        let Value::Object(map) = value else {
            return Err(parse_error("expected a JSON object of path → digest".into()));
        };

        let mut manifest = Manifest::new();
        for (path, digest) in map {
            let Value::String(digest) = digest else {
                return Err(parse_error(format!("digest for '{path}' is not a string")));
            };
            if !is_hex_digest(&digest) {
                return Err(parse_error(format!(
                    "digest for '{path}' is not a {DIGEST_HEX_LEN}-character hex string"
                )));
            }
            manifest.insert(PathBuf::from(path), digest.to_ascii_lowercase());
        }

        Ok(manifest)
    }
}

/// Equal when both list the same entries in the same order.
impl PartialEq for Manifest {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for Manifest {}

fn is_hex_digest(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}
