pub mod cache;
pub mod loader;
pub mod manifest;
pub mod set;

pub use cache::ManifestCache;
pub use loader::{ManifestError, ManifestLoader, MANIFEST_FILE_NAME};
pub use manifest::{Manifest, ManifestDocument};
pub use set::{
    Annotation, AnnotationSource, BreastDescriptor, ImageSet, Position, ViewDefinition, ViewImages,
};
