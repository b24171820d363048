pub mod catalog;
pub mod identifiers;

pub use catalog::{Side, SideStatus, Tag, ViewCode};
pub use identifiers::{ManifestVersion, SetId, SourceKey, SourceKeyError};
