use tracing::warn;

use crate::manifest::{Annotation, AnnotationSource, ImageSet, Manifest};

/// Annotations for `set`, following `from` pointers within `manifest`.
///
/// Returns an empty slice when the set has none, when a pointer names an
/// unknown set, or when the chain is longer than `max_depth`.
pub fn resolved_annotations<'a>(
    manifest: &'a Manifest,
    set: &'a ImageSet,
    max_depth: usize,
) -> &'a [Annotation] {
    let mut current = set;
    for _ in 0..=max_depth {
        match &current.annotations {
            Some(AnnotationSource::Inline(annotations)) => return annotations,
            Some(AnnotationSource::Delegated { from }) => match manifest.get_by_id(from) {
                Some(target) => current = target,
                None => {
                    warn!(set_id = %current.id, target = %from, "annotations delegate to unknown set");
                    return &[];
                }
            },
            None => return &[],
        }
    }

    warn!(set_id = %set.id, limit = max_depth, "annotation delegation exceeds depth");
    &[]
}
