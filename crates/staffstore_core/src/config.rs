//! Application configuration file.
//!
//! # Responsibility
//! - Describe organizations and the storage backend each one uses.
//! - Carry optional logging settings for front ends.
//!
//! # Invariants
//! - Organization keys are unique within one config.
//! - Relative backend paths are kept as written; callers resolve them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(String),
    #[error("unknown organization `{0}`")]
    UnknownOrganization(String),
}

/// Storage backend selection for one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    Json { path: PathBuf },
    Yaml { path: PathBuf },
    Sqlite { path: PathBuf },
    SqliteMemory,
}

impl BackendConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Json { .. } => "json",
            Self::Yaml { .. } => "yaml",
            Self::Sqlite { .. } => "sqlite",
            Self::SqliteMemory => "sqlite_memory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationConfig {
    pub key: String,
    pub name: String,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub organizations: Vec<OrganizationConfig>,
}

impl AppConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.check_unique_keys()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn organization(&self, key: &str) -> Result<&OrganizationConfig, ConfigError> {
        self.organizations
            .iter()
            .find(|organization| organization.key == key)
            .ok_or_else(|| ConfigError::UnknownOrganization(key.to_string()))
    }

    fn check_unique_keys(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for organization in &self.organizations {
            if !seen.insert(organization.key.as_str()) {
                return Err(ConfigError::Parse(format!(
                    "duplicate organization key `{}`",
                    organization.key
                )));
            }
        }
        Ok(())
    }
}
