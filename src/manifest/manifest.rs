// Read-only view of one source's catalog:
// no mutation
// no "update" methods
// lookups only

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::manifest::loader::ManifestError;
use crate::manifest::set::ImageSet;
use crate::types::{ManifestVersion, SetId, SourceKey};

/// On-disk shape of a manifest document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestDocument {
    #[serde(default)]
    pub sets: Vec<ImageSet>,
}

#[derive(Debug, Clone)]
pub struct Manifest {
    pub source: SourceKey,
    pub version: ManifestVersion,
    sets: Vec<ImageSet>,
}

impl Manifest {
    /// Parse raw document bytes. Set order is preserved; it feeds selection.
    pub fn from_slice(source: SourceKey, bytes: &[u8]) -> Result<Self, ManifestError> {
        let document: ManifestDocument = serde_json::from_slice(bytes)?;
        let version = ManifestVersion::from_content(bytes);
        Self::from_document(source, version, document)
    }

    pub fn from_document(
        source: SourceKey,
        version: ManifestVersion,
        document: ManifestDocument,
    ) -> Result<Self, ManifestError> {
        let mut seen = BTreeSet::new();
        for set in &document.sets {
            if !seen.insert(set.id.as_str()) {
                return Err(ManifestError::DuplicateSetId(set.id.as_str().to_string()));
            }
        }

        Ok(Manifest {
            source,
            version,
            sets: document.sets,
        })
    }

    pub fn sets(&self) -> &[ImageSet] {
        &self.sets
    }

    /// Direct lookup; disabled sets stay addressable here.
    pub fn get(&self, id: &str) -> Option<&ImageSet> {
        self.sets.iter().find(|set| set.id.as_str() == id)
    }

    pub fn get_by_id(&self, id: &SetId) -> Option<&ImageSet> {
        self.get(id.as_str())
    }

    pub fn available(&self, include_disabled: bool) -> Vec<&ImageSet> {
        self.sets
            .iter()
            .filter(|set| include_disabled || !set.disabled)
            .collect()
    }

    pub fn has_selectable_sets(&self) -> bool {
        self.sets.iter().any(|set| !set.disabled)
    }
}
