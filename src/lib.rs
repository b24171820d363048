//! Deterministic image-set selection and resolution for screening events.
//!
//! `image-set-core` picks one catalogued image set for a clinical imaging
//! event and resolves it into per-view media paths. Selection is a pure
//! function of the event id, the source catalog and the caller's options:
//! identical inputs always produce the identical set, across calls and
//! across processes.
//!
//! Pipeline: manifest loading → context extraction → weight resolution →
//! hard filtering → seeded tag and set draws → path resolution → per-event
//! view assembly.

pub mod config;
pub mod context;
pub mod engine;
pub mod manifest;
pub mod resolve;
pub mod selection;
pub mod types;

pub use config::{ConfigError, EngineConfig};
pub use context::{extract_context, Context, EventRecord};
pub use engine::{extract_event_context, ImageSetEngine, ListOptions, SelectionOptions};
pub use manifest::{ImageSet, Manifest, ManifestError};
pub use resolve::{EventImages, ViewPathMap, ViewPaths};
pub use selection::WeightTable;
pub use types::{SetId, Side, SourceKey, Tag, ViewCode};
