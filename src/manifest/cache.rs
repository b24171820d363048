use std::collections::BTreeMap;
use std::fs;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::manifest::loader::{ManifestError, ManifestLoader};
use crate::manifest::manifest::Manifest;
use crate::types::SourceKey;

#[derive(Debug, Clone)]
struct CachedManifest {
    modified: Option<SystemTime>,
    len: u64,
    manifest: Arc<Manifest>,
    loaded_at: DateTime<Utc>, // informational only
}

/// Opt-in manifest cache.
///
/// Entries are keyed by source and invalidated whenever the document's
/// modification time or length changes, so an unchanged document always
/// yields the same catalog it would have on a fresh read.
#[derive(Debug, Default)]
pub struct ManifestCache {
    entries: RwLock<BTreeMap<SourceKey, CachedManifest>>,
}

impl ManifestCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(
        &self,
        loader: &ManifestLoader,
        source: &SourceKey,
    ) -> Result<Arc<Manifest>, ManifestError> {
        let path = loader.manifest_path(source);
        let stat = match fs::metadata(&path) {
            Ok(stat) => stat,
            Err(e) => {
                self.evict(source);
                return Err(e.into());
            }
        };
        let modified = stat.modified().ok();
        let len = stat.len();

        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = entries.get(source) {
                if entry.modified.is_some() && entry.modified == modified && entry.len == len {
                    return Ok(Arc::clone(&entry.manifest));
                }
            }
        }

        let manifest = match loader.load(source) {
            Ok(manifest) => Arc::new(manifest),
            Err(e) => {
                self.evict(source);
                return Err(e);
            }
        };

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            source.clone(),
            CachedManifest {
                modified,
                len,
                manifest: Arc::clone(&manifest),
                loaded_at: Utc::now(),
            },
        );
        Ok(manifest)
    }

    /// When the cached copy of `source` was read, if one is held.
    pub fn loaded_at(&self, source: &SourceKey) -> Option<DateTime<Utc>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(source).map(|entry| entry.loaded_at)
    }

    pub fn evict(&self, source: &SourceKey) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(source);
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
