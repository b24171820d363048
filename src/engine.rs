//! Public entry points.
//!
//! Every operation reads the manifest for its source (fresh, unless the
//! opt-in cache is enabled) and degrades to an empty result when the catalog
//! is unavailable or an identifier is unknown. Nothing here returns an error
//! for catalog problems; they are logged and surface as `None` / empty.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{ConfigError, EngineConfig};
use crate::context::{extract_context, Context, EventRecord};
use crate::manifest::{
    Annotation, AnnotationSource, ImageSet, Manifest, ManifestCache, ManifestLoader,
};
use crate::resolve::{
    assemble_event_images, resolved_annotations, EventImages, MediaLayout, PathResolver,
    ViewPathMap,
};
use crate::selection::{
    filter_eligible_or_all, resolve_weights, LcgSampler, Selection, SetSelector, WeightTable,
};
use crate::types::{SourceKey, Tag};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub include_disabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionOptions {
    /// Event whose clinical record drives filtering and view presence.
    pub event: Option<EventRecord>,
    /// Pick uniformly within this tag when it has eligible sets.
    pub forced_tag: Option<Tag>,
    /// Overrides every other weight table.
    pub weights: Option<WeightTable>,
}

impl SelectionOptions {
    pub fn for_event(event: EventRecord) -> Self {
        Self {
            event: Some(event),
            ..Self::default()
        }
    }

    pub fn with_forced_tag(mut self, tag: Tag) -> Self {
        self.forced_tag = Some(tag);
        self
    }

    pub fn with_weights(mut self, weights: WeightTable) -> Self {
        self.weights = Some(weights);
        self
    }
}

pub struct ImageSetEngine {
    config: EngineConfig,
    loader: ManifestLoader,
    layout: MediaLayout,
    selector: SetSelector<LcgSampler>,
    cache: Option<ManifestCache>,
}

impl ImageSetEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let loader = ManifestLoader::new(config.catalog_root.clone());
        let layout = MediaLayout::from_config(&config);
        let cache = config.cache_manifests.then(ManifestCache::new);

        Ok(Self {
            config,
            loader,
            layout,
            selector: SetSelector::default(),
            cache,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The manifest for `source`, or `None` when it is unavailable.
    pub fn load_manifest(&self, source: &str) -> Option<Arc<Manifest>> {
        let key = match SourceKey::parse(source) {
            Ok(key) => key,
            Err(e) => {
                warn!(source, error = %e, "rejected source key");
                return None;
            }
        };

        let loaded = match &self.cache {
            Some(cache) => cache.get_or_load(&self.loader, &key),
            None => self.loader.load(&key).map(Arc::new),
        };

        match loaded {
            Ok(manifest) => Some(manifest),
            Err(e) if e.is_missing() => {
                debug!(source, "no manifest for source");
                None
            }
            Err(e) => {
                warn!(source, error = %e, "manifest unavailable");
                None
            }
        }
    }

    pub fn get_available_sets(&self, source: &str, options: ListOptions) -> Vec<ImageSet> {
        self.load_manifest(source)
            .map(|manifest| {
                manifest
                    .available(options.include_disabled)
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Direct lookup, disabled sets included.
    pub fn get_set_by_id(&self, id: &str, source: &str) -> Option<ImageSet> {
        self.load_manifest(source)?.get(id).cloned()
    }

    pub fn has_image_sets(&self, source: &str) -> bool {
        self.load_manifest(source)
            .is_some_and(|manifest| manifest.has_selectable_sets())
    }

    pub fn get_image_set_for_event(
        &self,
        event_id: &str,
        source: &str,
        options: &SelectionOptions,
    ) -> Option<ImageSet> {
        let manifest = self.load_manifest(source)?;
        let set = self.select(&manifest, event_id, options)?.set.clone();
        Some(set)
    }

    pub fn get_image_paths(&self, set_id: &str, source: &str) -> Option<ViewPathMap> {
        let manifest = self.load_manifest(source)?;
        let paths = self.resolver(&manifest).resolve_set(set_id)?;
        Some(paths)
    }

    pub fn get_images_for_event(
        &self,
        event_id: &str,
        source: &str,
        options: &SelectionOptions,
    ) -> Option<EventImages> {
        let manifest = self.load_manifest(source)?;
        let selection = self.select(&manifest, event_id, options)?;
        let resolved = self.resolver(&manifest).resolve(selection.set);

        Some(assemble_event_images(
            selection.set.clone(),
            resolved,
            options.event.as_ref(),
        ))
    }

    /// Annotations for `set`, following `from` pointers within `source`.
    pub fn get_resolved_annotations(&self, set: &ImageSet, source: &str) -> Vec<Annotation> {
        match self.load_manifest(source) {
            Some(manifest) => {
                resolved_annotations(&manifest, set, self.config.max_delegation_depth).to_vec()
            }
            // No catalog to follow pointers into; only inline annotations survive
            None => match &set.annotations {
                Some(AnnotationSource::Inline(annotations)) => annotations.clone(),
                _ => Vec::new(),
            },
        }
    }

    /// Run selection against an already loaded manifest.
    pub fn select<'m>(
        &self,
        manifest: &'m Manifest,
        event_id: &str,
        options: &SelectionOptions,
    ) -> Option<Selection<'m>> {
        let context = options
            .event
            .as_ref()
            .map(extract_context)
            .unwrap_or_default();

        let pool = manifest.available(false);
        let eligible = filter_eligible_or_all(&pool, &context);
        let weights = resolve_weights(&context, options.weights.as_ref(), self.config.weights.as_ref());

        self.selector
            .select(&eligible, &weights, event_id, options.forced_tag, &context)
    }

    fn resolver<'m>(&'m self, manifest: &'m Manifest) -> PathResolver<'m> {
        PathResolver::new(manifest, &self.layout, self.config.max_delegation_depth)
    }
}

/// Selection signals for an event; see [`extract_context`].
pub fn extract_event_context(event: &EventRecord) -> Context {
    extract_context(event)
}
