pub mod annotations;
pub mod assemble;
pub mod paths;

pub use annotations::resolved_annotations;
pub use assemble::{assemble_event_images, EventImages};
pub use paths::{MediaLayout, PathResolver, ResolveError, SetFolder, ViewPathMap, ViewPaths};
