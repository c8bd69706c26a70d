//! Application configuration
//!
//! Loaded from a JSON file; every field has a default so an empty object is a
//! valid configuration. The dataset path can be overridden with the
//! `INVENTORY_DATASET` environment variable. Secrets are never stored here,
//! only the name of the environment variable holding them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::error::ConfigError;
use crate::stages::distribution::transport::Credential;

/// Environment variable that overrides [`AppConfig::dataset_path`]
pub const DATASET_ENV: &str = "INVENTORY_DATASET";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backing CSV file of the dataset
    pub dataset_path: PathBuf,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Remote mirror; `None` keeps every write local
    pub remote: Option<RemoteConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("lego.csv"),
            log_level: "info".to_string(),
            remote: None,
        }
    }
}

impl AppConfig {
    /// Read, apply the environment override, and validate
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: AppConfig =
            serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus the environment override, for running without a file
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(path) = std::env::var(DATASET_ENV) {
            if !path.trim().is_empty() {
                self.dataset_path = PathBuf::from(path);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dataset_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("dataset_path must not be empty".into()));
        }
        if let Some(remote) = &self.remote {
            remote.validate()?;
        }
        Ok(())
    }
}

/// Remote mirror settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub repository_url: String,
    /// Branch pushed to
    pub branch: String,
    /// Location of the dataset file inside the mirror
    pub dataset_path_in_repo: PathBuf,
    pub commit_message: String,
    /// Scratch directory for the working copy, deleted before and after every
    /// publish. An existing directory here that is neither empty nor a git
    /// working copy is never deleted; the publish fails at the prepare step.
    pub workdir: PathBuf,
    /// Environment variable holding the access token
    pub token_env: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            repository_url: String::new(),
            branch: "main".to_string(),
            dataset_path_in_repo: PathBuf::from("lego.csv"),
            commit_message: "Add new inventory record".to_string(),
            workdir: std::env::temp_dir().join("inventory-browser-sync"),
            token_env: "GITHUB_TOKEN".to_string(),
            author_name: None,
            author_email: None,
        }
    }
}

impl RemoteConfig {
    pub fn new(repository_url: impl Into<String>) -> Self {
        Self {
            repository_url: repository_url.into(),
            ..Self::default()
        }
    }

    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    /// The access token, if the configured variable is set
    pub fn credential(&self) -> Option<Credential> {
        Credential::from_env(&self.token_env)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repository_url.trim().is_empty() {
            return Err(ConfigError::Invalid("remote.repository_url must not be empty".into()));
        }
        if self.branch.trim().is_empty() {
            return Err(ConfigError::Invalid("remote.branch must not be empty".into()));
        }
        if self.commit_message.trim().is_empty() {
            return Err(ConfigError::Invalid("remote.commit_message must not be empty".into()));
        }
        if self.dataset_path_in_repo.is_absolute()
            || self.dataset_path_in_repo.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid(
                "remote.dataset_path_in_repo must be a relative path".into(),
            ));
        }
        if self.workdir.as_os_str().is_empty() || self.workdir.parent().is_none() {
            return Err(ConfigError::Invalid(
                "remote.workdir must name a dedicated directory".into(),
            ));
        }
        Ok(())
    }
}
