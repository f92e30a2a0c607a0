//! # Service Configuration
//!
//! Where the server listens and where the store lives.
//!
//! Values are resolved in this order, later sources winning:
//!
//! 1. built-in defaults
//! 2. an optional YAML file (`--config`)
//! 3. environment variables
//! 4. command-line flags (applied by [`crate::cli`])
//!
//! ## YAML
//!
//! ```yaml
//! server:
//!   addr: 0.0.0.0:8080
//! store:
//!   data_dir: data
//!   file_name: survey_submissions.json
//!   on_corrupt: reject      # or: overwrite
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Field |
//! |---|---|
//! | `SURVEY_ADDR` | `server.addr` |
//! | `SURVEY_DATA_DIR` | `store.data_dir` |
//! | `SURVEY_STORE_FILE` | `store.file_name` |
//! | `SURVEY_CORRUPT_STORE_POLICY` | `store.on_corrupt` |

use crate::store::{CorruptStorePolicy, JsonFileStore, DEFAULT_DATA_DIR, DEFAULT_STORE_FILE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub addr: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    pub data_dir: PathBuf,
    pub file_name: String,
    pub on_corrupt: CorruptStorePolicy,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            file_name: DEFAULT_STORE_FILE.to_string(),
            on_corrupt: CorruptStorePolicy::default(),
        }
    }
}

/// Fully resolved service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub server: ServerSection,
    pub store: StoreSection,
}

#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The config file is not valid YAML for [`ServiceConfig`]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    /// An environment variable holds an unusable value
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },
    /// A resolved value is unusable (e.g. empty store file name)
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "failed to read config '{}': {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid config '{}': {}", path.display(), source)
            }
            ConfigError::InvalidEnv { var, value, reason } => {
                write!(f, "invalid value '{value}' for {var}: {reason}")
            }
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::InvalidEnv { .. } | ConfigError::Invalid(_) => None,
        }
    }
}

impl ServiceConfig {
    /// Read a YAML config file. Missing sections and keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Overlay `SURVEY_*` environment variables.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay variables resolved through `lookup`.
    pub fn apply_env_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("SURVEY_ADDR") {
            self.server.addr = addr;
        }
        if let Some(dir) = lookup("SURVEY_DATA_DIR") {
            self.store.data_dir = PathBuf::from(dir);
        }
        if let Some(name) = lookup("SURVEY_STORE_FILE") {
            self.store.file_name = name;
        }
        if let Some(policy) = lookup("SURVEY_CORRUPT_STORE_POLICY") {
            self.store.on_corrupt = policy
                .parse::<CorruptStorePolicy>()
                .map_err(|reason| ConfigError::InvalidEnv {
                    var: "SURVEY_CORRUPT_STORE_POLICY",
                    value: policy.clone(),
                    reason,
                })?;
        }
        Ok(self)
    }

    /// Reject values that would only fail later at request time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.addr.trim().is_empty() {
            return Err(ConfigError::Invalid("server.addr is empty".to_string()));
        }
        let name = self.store.file_name.trim();
        if name.is_empty() {
            return Err(ConfigError::Invalid("store.file_name is empty".to_string()));
        }
        if Path::new(name).components().count() != 1 {
            return Err(ConfigError::Invalid(format!(
                "store.file_name '{name}' must be a plain file name"
            )));
        }
        Ok(())
    }

    /// Build the file store described by the `store` section.
    #[must_use]
    pub fn file_store(&self) -> JsonFileStore {
        JsonFileStore::new(
            self.store.data_dir.clone(),
            self.store.file_name.trim(),
            self.store.on_corrupt,
        )
    }
}
