use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::manifest::manifest::Manifest;
use crate::types::{SourceKey, SourceKeyError};

/// File name of the manifest document inside each source directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid source key: {0}")]
    InvalidSource(#[from] SourceKeyError),
    #[error("Duplicate set ID: {0}")]
    DuplicateSetId(String),
}

impl ManifestError {
    /// A source that simply has no catalog yet, as opposed to a broken one.
    pub fn is_missing(&self) -> bool {
        matches!(self, ManifestError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Reads manifest documents from `<catalog_root>/<source>/manifest.json`.
///
/// Every call re-reads the document; nothing is retained between calls.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    catalog_root: PathBuf,
}

impl ManifestLoader {
    pub fn new(catalog_root: impl Into<PathBuf>) -> Self {
        Self {
            catalog_root: catalog_root.into(),
        }
    }

    pub fn catalog_root(&self) -> &Path {
        &self.catalog_root
    }

    pub fn source_dir(&self, source: &SourceKey) -> PathBuf {
        self.catalog_root.join(source.as_str())
    }

    pub fn manifest_path(&self, source: &SourceKey) -> PathBuf {
        self.source_dir(source).join(MANIFEST_FILE_NAME)
    }

    pub fn load(&self, source: &SourceKey) -> Result<Manifest, ManifestError> {
        let bytes = fs::read(self.manifest_path(source))?;
        Manifest::from_slice(source.clone(), &bytes)
    }

    /// Load by raw source name, validating it first.
    pub fn load_source(&self, source: &str) -> Result<Manifest, ManifestError> {
        let key = SourceKey::parse(source)?;
        self.load(&key)
    }
}
