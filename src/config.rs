//! Engine configuration.
//!
//! Resolved once by the host and passed into [`ImageSetEngine`](crate::engine::ImageSetEngine);
//! the engine never reads environment variables or config files on its own.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::selection::WeightTable;

pub const DEFAULT_PUBLIC_PREFIX: &str = "/images/mammograms";
pub const DEFAULT_EXTENSION: &str = "png";
pub const DEFAULT_MAX_DELEGATION_DEPTH: usize = 8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding one sub-directory per source.
    pub catalog_root: PathBuf,
    /// Prefix for every resolved media path.
    pub public_prefix: String,
    /// Used for standard sets whose folder holds no view file.
    pub default_extension: String,
    pub max_delegation_depth: usize,
    /// Table applied when no contextual table takes precedence.
    pub weights: Option<WeightTable>,
    /// Re-read manifests only when the document changes on disk.
    pub cache_manifests: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catalog_root: PathBuf::from("catalog"),
            public_prefix: DEFAULT_PUBLIC_PREFIX.to_string(),
            default_extension: DEFAULT_EXTENSION.to_string(),
            max_delegation_depth: DEFAULT_MAX_DELEGATION_DEPTH,
            weights: None,
            cache_manifests: false,
        }
    }
}

impl EngineConfig {
    pub fn new(catalog_root: impl Into<PathBuf>) -> Self {
        Self {
            catalog_root: catalog_root.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_extension.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_extension cannot be empty".into(),
            ));
        }
        if self.default_extension.contains(['.', '/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "default_extension must be a bare extension, got {:?}",
                self.default_extension
            )));
        }
        if self.max_delegation_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_delegation_depth must be at least 1".into(),
            ));
        }
        if let Some(weights) = &self.weights {
            if !weights.is_valid() {
                return Err(ConfigError::Invalid(
                    "weights must be finite and non-negative".into(),
                ));
            }
        }
        Ok(())
    }
}
