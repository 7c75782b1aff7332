use std::path::{Path, PathBuf};

use crate::adapters::fs::atomic;
use crate::core::errors::{BackupError, Result};
use crate::core::models::manifest::Manifest;
use crate::core::services::hasher::hash_file;

/// Outcome of re-hashing the files listed in a manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftReport {
    /// Number of paths the manifest lists.
    pub checked: usize,
    /// Paths whose content no longer matches, in manifest order.
    /// Files that are missing or unreadable count as changed.
    pub changed: Vec<PathBuf>,
}

impl DriftReport {
    /// Returns true if every file still matches its recorded digest.
    pub fn is_clean(&self) -> bool {
        self.changed.is_empty()
    }
}

/// Builds hash manifests and checks files against them.
pub struct ManifestService;

impl ManifestService {
    /// Hash every file in `files` (input order is kept) and write the
    /// manifest to `output`, replacing any existing file.
    ///
    /// Any unreadable file aborts the whole operation and nothing is
    /// written: a partial manifest would hide drift later.
    pub fn build_and_save(&self, files: &[PathBuf], output: &Path) -> Result<Manifest> {
        let mut manifest = Manifest::new();
        for file in files {
            let digest = hash_file(file)?;
            tracing::debug!(file = %file.display(), %digest, "hashed");
            manifest.insert(file.clone(), digest);
        }

        let json = manifest.to_json()?;
        atomic::write_atomic(output, json.as_bytes())?;

        tracing::info!(
            manifest = %output.display(),
            files = manifest.len(),
            "hash manifest saved"
        );
        Ok(manifest)
    }

    /// Load a manifest from disk.
    pub fn load(&self, manifest_path: &Path) -> Result<Manifest> {
        let content = std::fs::read_to_string(manifest_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BackupError::FileNotFound {
                path: manifest_path.to_path_buf(),
            },
            _ => BackupError::ReadFailed {
                path: manifest_path.to_path_buf(),
                source: e,
            },
        })?;
        Manifest::from_json(&content, manifest_path)
    }

    /// Re-hash every file the manifest lists and report the ones that drifted.
    ///
    /// Per-file failures are drift, not errors; every entry is checked.
    /// Only a missing or malformed manifest fails the call.
    pub fn verify(&self, manifest_path: &Path) -> Result<DriftReport> {
        let manifest = self.load(manifest_path)?;
        if manifest.is_empty() {
            tracing::warn!(manifest = %manifest_path.display(), "manifest lists no files");
        }
        let mut changed = Vec::new();

        for (path, expected) in manifest.iter() {
            match hash_file(path) {
                Ok(current) if current == expected => {}
                Ok(current) => {
                    tracing::warn!(
                        file = %path.display(),
                        %expected,
                        %current,
                        "content changed"
                    );
                    changed.push(path.to_path_buf());
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "cannot re-hash");
                    changed.push(path.to_path_buf());
                }
            }
        }

        tracing::info!(
            manifest = %manifest_path.display(),
            checked = manifest.len(),
            changed = changed.len(),
            "manifest verified"
        );
        Ok(DriftReport {
            checked: manifest.len(),
            changed,
        })
    }
}
