use std::path::Path;
use std::time::Duration;

use reqwest::Url;

use crate::adapters::fs::atomic;
use crate::adapters::storage::local_store::validate_object_name;
use crate::core::errors::{BackupError, Result};
use crate::core::traits::object_store::ObjectStore;

/// Google Cloud Storage over the JSON API.
///
/// Authenticates with an OAuth2 bearer token (e.g. the output of
/// `gcloud auth print-access-token`) taken from an environment variable.
/// Calls block the caller; there are no retries.
pub struct GcsObjectStore {
    endpoint: Url,
    bucket: String,
    token: String,
    timeout: Duration,
}

impl GcsObjectStore {
    /// Build a store for `bucket`, reading the access token from `token_env`.
    pub fn from_env(endpoint: &str, bucket: &str, token_env: &str, timeout: Duration) -> Result<Self> {
        let token = std::env::var(token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| BackupError::StorageFailed {
                reason: format!(
                    "{token_env} is not set\n\n  \
                     Export an access token for the bucket, e.g.:\n    \
                     → export {token_env}=\"$(gcloud auth print-access-token)\""
                ),
            })?;
        Self::new(endpoint, bucket, token.trim().to_string(), timeout)
    }

    pub fn new(endpoint: &str, bucket: &str, token: String, timeout: Duration) -> Result<Self> {
        if bucket.is_empty() {
            return Err(BackupError::InvalidConfig {
                detail: "remote.bucket is empty".into(),
            });
        }
        let endpoint = Url::parse(endpoint).map_err(|e| BackupError::InvalidConfig {
            detail: format!("Invalid remote.endpoint '{endpoint}': {e}"),
        })?;
        Ok(Self {
            endpoint,
            bucket: bucket.to_string(),
            token,
            timeout,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| BackupError::InvalidConfig {
                detail: format!("remote.endpoint '{}' cannot be a base URL", self.endpoint),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Media upload endpoint for `object`.
    pub(crate) fn upload_url(&self, object: &str) -> Result<Url> {
        let mut url = self.url(&["upload", "storage", "v1", "b", &self.bucket, "o"])?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", object);
        Ok(url)
    }

    /// Media download endpoint for `object`.
    pub(crate) fn download_url(&self, object: &str) -> Result<Url> {
        let mut url = self.url(&["storage", "v1", "b", &self.bucket, "o", object])?;
        url.query_pairs_mut().append_pair("alt", "media");
        Ok(url)
    }

    fn build_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(format!("autobackup/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackupError::StorageFailed {
                reason: format!("Failed to create HTTP client: {e}"),
            })
    }

    fn runtime() -> Result<tokio::runtime::Runtime> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| BackupError::StorageFailed {
                reason: format!("Failed to create async runtime: {e}"),
            })
    }
}

impl ObjectStore for GcsObjectStore {
    fn upload(&self, local: &Path, object: &str) -> Result<()> {
        validate_object_name(object)?;
        let data = std::fs::read(local).map_err(|e| BackupError::ReadFailed {
            path: local.to_path_buf(),
            source: e,
        })?;
        let url = self.upload_url(object)?;

        Self::runtime()?.block_on(async {
            let client = self.build_client()?;
            let resp = client
                .post(url)
                .bearer_auth(&self.token)
                .header("Content-Type", "application/octet-stream")
                .body(data)
                .send()
                .await
                .map_err(|e| BackupError::StorageFailed {
                    reason: format!("Upload request failed: {e}"),
                })?;

            if !resp.status().is_success() {
                return Err(BackupError::StorageFailed {
                    reason: format!("Upload of '{object}' returned status {}", resp.status()),
                });
            }
            Ok(())
        })
    }

    fn download(&self, object: &str, local: &Path) -> Result<()> {
        validate_object_name(object)?;
        let url = self.download_url(object)?;

        let bytes = Self::runtime()?.block_on(async {
            let client = self.build_client()?;
            let resp = client
                .get(url)
                .bearer_auth(&self.token)
                .send()
                .await
                .map_err(|e| BackupError::StorageFailed {
                    reason: format!("Download request failed: {e}"),
                })?;

            if !resp.status().is_success() {
                return Err(BackupError::StorageFailed {
                    reason: format!("Download of '{object}' returned status {}", resp.status()),
                });
            }

            resp.bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| BackupError::StorageFailed {
                    reason: format!("Failed to read download: {e}"),
                })
        })?;

        atomic::write_atomic(local, &bytes)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("gs://{}", self.bucket)
    }
}
