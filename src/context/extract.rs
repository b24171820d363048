use std::collections::BTreeSet;

use serde::Serialize;

use crate::context::event::EventRecord;
use crate::types::{Side, ViewCode};

/// Selection-relevant signals derived from one event.
///
/// Recomputed on every selection call and never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub has_symptoms: bool,
    pub symptom_sides: BTreeSet<Side>,
    pub has_implants: bool,
    pub is_imperfect: bool,
    pub has_repeat: bool,
    pub has_extra_images: bool,
    pub repeat_views: BTreeSet<ViewCode>,
}

/// Derive a [`Context`] from an event record. Total: never fails.
pub fn extract_context(event: &EventRecord) -> Context {
    let symptom_sides = event
        .symptoms
        .iter()
        .flat_map(|symptom| {
            [symptom.location.as_deref(), symptom.nipple_location.as_deref()]
                .into_iter()
                .flatten()
                .flat_map(sides_from_location)
        })
        .collect();

    let has_implants = event
        .medical_history
        .breast_implants
        .iter()
        .any(|implant| !implant.removed);

    let (is_imperfect, has_extra_images, repeat_views) = match &event.imaging {
        Some(imaging) => (
            imaging.imperfect_but_best_possible,
            imaging.extra_images_taken,
            imaging.retaken_views().collect::<BTreeSet<_>>(),
        ),
        None => (false, false, BTreeSet::new()),
    };

    Context {
        has_symptoms: !event.symptoms.is_empty(),
        symptom_sides,
        has_implants,
        is_imperfect,
        has_repeat: !repeat_views.is_empty(),
        has_extra_images,
        repeat_views,
    }
}

/// Map free-text location ("left breast", "Both nipples", ...) to sides.
pub fn sides_from_location(location: &str) -> Vec<Side> {
    let location = location.to_lowercase();
    if location.contains("both") {
        return vec![Side::Left, Side::Right];
    }

    let mut sides = Vec::with_capacity(1);
    if location.contains("left") {
        sides.push(Side::Left);
    }
    if location.contains("right") {
        sides.push(Side::Right);
    }
    sides
}
