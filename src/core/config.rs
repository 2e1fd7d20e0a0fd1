//! Layered configuration
//!
//! Sources, later ones winning:
//! 1. Global `config.yaml` in the platform config directory
//! 2. Project `.qcspc/config.yaml`, searched upward from the working directory
//! 3. `QCSPC_*` environment variables

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::standards::StandardType;

/// Directory holding the project config
pub const PROJECT_DIR: &str = ".qcspc";

const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config YAML: {message}")]
    Yaml { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Standard type used for specification-limit lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_type: Option<String>,

    /// Default records file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<PathBuf>,

    /// Default standards file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standards: Option<PathBuf>,

    /// Default output format name (auto, json, yaml, csv, table)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,
}

impl Config {
    /// Load and merge every available layer
    ///
    /// Unreadable or malformed files are logged and skipped.
    pub fn load() -> Self {
        let mut config = Config::default();

        if let Some(path) = Self::global_path() {
            config.merge_file(&path, Self::from_file);
        }
        if let Ok(cwd) = std::env::current_dir() {
            if let Some(path) = Self::find_project_config(&cwd) {
                config.merge_file(&path, Self::from_project_file);
            }
        }
        config.merge(Self::from_env(|key| std::env::var(key).ok()));
        config
    }

    /// Global config location, e.g. `~/.config/qcspc/config.yaml`
    pub fn global_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "qcspc")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Nearest `.qcspc/config.yaml` at or above `start`
    pub fn find_project_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(PROJECT_DIR).join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str(contents).map_err(|e| ConfigError::Yaml {
            message: e.to_string(),
        })
    }

    /// Read a config file; paths in it are taken as written
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Read `<root>/.qcspc/config.yaml`, resolving relative file paths
    /// against the project root rather than the working directory
    pub fn from_project_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        if let Some(root) = path.parent().and_then(Path::parent) {
            config.records = config.records.map(|p| root.join(p));
            config.standards = config.standards.map(|p| root.join(p));
        }
        Ok(config)
    }

    /// Settings from `QCSPC_*` variables, read through `lookup`
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Config {
            standard_type: get("QCSPC_STANDARD_TYPE"),
            records: get("QCSPC_RECORDS").map(PathBuf::from),
            standards: get("QCSPC_STANDARDS").map(PathBuf::from),
            default_format: get("QCSPC_FORMAT"),
        }
    }

    fn merge_file(&mut self, path: &Path, read: fn(&Path) -> Result<Self, ConfigError>) {
        if !path.is_file() {
            return;
        }
        match read(path) {
            Ok(layer) => {
                tracing::debug!(path = %path.display(), "loaded config layer");
                self.merge(layer);
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping config file"),
        }
    }

    /// Overlay every field `other` sets
    pub fn merge(&mut self, other: Config) {
        if other.standard_type.is_some() {
            self.standard_type = other.standard_type;
        }
        if other.records.is_some() {
            self.records = other.records;
        }
        if other.standards.is_some() {
            self.standards = other.standards;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Standard type to look up, defaulting to internal control
    pub fn standard_type(&self) -> StandardType {
        self.standard_type
            .as_deref()
            .map(StandardType::from)
            .unwrap_or_default()
    }
}
