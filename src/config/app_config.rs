use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::errors::{BackupError, Result};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "autobackup.toml";

/// Top-level AutoBackup configuration.
///
/// Every section and field has a default, so an empty file (or no file
/// at all) is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub backup: BackupSection,
    pub crypto: CryptoSection,
    pub remote: RemoteSection,
    pub logging: LoggingSection,
}

impl AppConfig {
    /// Resolve and load the configuration.
    ///
    /// An explicit path must exist. Otherwise `./autobackup.toml` is tried,
    /// then `<config_dir>/autobackup/config.toml`, then the built-in
    /// defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(BackupError::InvalidConfig {
                    detail: format!("Config file not found: {}", path.display()),
                });
            }
            return Self::from_file(path);
        }

        match Self::discover() {
            Some(path) => Self::from_file(&path),
            None => {
                tracing::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse and validate a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BackupError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::from_toml(&content).map_err(|e| match e {
            BackupError::InvalidConfig { detail } => BackupError::InvalidConfig {
                detail: format!("{}: {detail}", path.display()),
            },
            other => other,
        })?;
        tracing::debug!(config = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate TOML content.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| BackupError::InvalidConfig {
            detail: format!("Failed to parse config: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.backup.window_days == 0 {
            return Err(BackupError::InvalidConfig {
                detail: "backup.window_days must be at least 1".into(),
            });
        }
        if self.remote.timeout_secs == 0 {
            return Err(BackupError::InvalidConfig {
                detail: "remote.timeout_secs must be at least 1".into(),
            });
        }
        match self.remote.backend.as_str() {
            BACKEND_GCS | BACKEND_LOCAL => Ok(()),
            other => Err(BackupError::InvalidConfig {
                detail: format!(
                    "Unknown remote.backend '{other}'. Expected '{BACKEND_GCS}' or '{BACKEND_LOCAL}'."
                ),
            }),
        }
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("autobackup").join("config.toml"))
            .filter(|path| path.is_file())
    }
}

pub const BACKEND_GCS: &str = "gcs";
pub const BACKEND_LOCAL: &str = "local";

/// The `[backup]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackupSection {
    /// Where archives, manifests, artifacts and the history live.
    pub dir: PathBuf,
    /// Files modified within this many days are backed up.
    pub window_days: u32,
    /// Keep plaintext archives after encryption and after restore.
    pub keep_plaintext: bool,
}

impl Default for BackupSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("backups"),
            window_days: 2,
            keep_plaintext: false,
        }
    }
}

/// The `[crypto]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CryptoSection {
    pub key_file: PathBuf,
}

impl Default for CryptoSection {
    fn default() -> Self {
        Self {
            key_file: PathBuf::from(crate::adapters::key_stores::file_key_store::DEFAULT_KEY_FILE),
        }
    }
}

/// The `[remote]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteSection {
    /// `gcs` or `local`.
    pub backend: String,
    pub bucket: Option<String>,
    /// Local backend only: directory holding one sub-directory per bucket.
    pub root: PathBuf,
    pub endpoint: String,
    /// Environment variable holding the GCS access token.
    pub token_env: String,
    pub timeout_secs: u64,
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            backend: BACKEND_GCS.into(),
            bucket: None,
            root: PathBuf::from("remote"),
            endpoint: "https://storage.googleapis.com".into(),
            token_env: "GCS_ACCESS_TOKEN".into(),
            timeout_secs: 120,
        }
    }
}

/// The `[logging]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub file: PathBuf,
    /// Default filter directive, e.g. `info` or `autobackup=debug`.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            file: PathBuf::from("logs/autobackup.log"),
            level: "info".into(),
        }
    }
}
