use std::collections::BTreeMap;

use serde::Serialize;

use crate::context::EventRecord;
use crate::manifest::ImageSet;
use crate::resolve::paths::ViewPathMap;
use crate::types::ViewCode;

/// Images to show for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventImages {
    pub set: ImageSet,
    /// Latest image per view.
    pub paths: BTreeMap<ViewCode, String>,
    /// Full retake series per view, oldest first.
    pub all_paths: ViewPathMap,
    pub has_additional_images: bool,
}

/// Combine a selected set's resolved paths with what the event actually captured.
///
/// Views the event never captured are dropped. An event without any imaging
/// record, or no event at all, keeps every resolved view.
pub fn assemble_event_images(
    set: ImageSet,
    resolved: ViewPathMap,
    event: Option<&EventRecord>,
) -> EventImages {
    let imaging = event.and_then(|event| event.imaging.as_ref());

    let all_paths: ViewPathMap = resolved
        .into_iter()
        .filter(|(view, _)| imaging.map_or(true, |imaging| imaging.is_captured(*view)))
        .collect();

    let paths = all_paths
        .iter()
        .map(|(view, images)| (*view, images.latest().to_string()))
        .collect();

    let event_retake = imaging.is_some_and(|imaging| imaging.retaken_views().next().is_some());
    let has_additional_images = event_retake || all_paths.values().any(|images| images.is_multi());

    EventImages {
        set,
        paths,
        all_paths,
        has_additional_images,
    }
}
