use tracing::debug;

use crate::context::Context;
use crate::manifest::ImageSet;
use crate::selection::prng::{Sampler, REPEAT_SUFFIX, SIDE_SUFFIX};
use crate::types::{SideStatus, Tag, ViewCode};

/// Probability of ignoring a soft preference altogether.
pub const SOFT_PREFERENCE_SKIP_PROBABILITY: f64 = 0.7;

/// Hard filters: implants, extra images and repeats must each match the event.
///
/// May return an empty list; the caller decides how to degrade.
pub fn filter_eligible<'a>(sets: &[&'a ImageSet], context: &Context) -> Vec<&'a ImageSet> {
    sets.iter()
        .copied()
        .filter(|set| set.has_implants == context.has_implants)
        .filter(|set| set.has_extra_images == context.has_extra_images)
        .filter(|set| set.has_repeat == context.has_repeat)
        .collect()
}

/// [`filter_eligible`], falling back to the full pool when nothing survives.
pub fn filter_eligible_or_all<'a>(sets: &[&'a ImageSet], context: &Context) -> Vec<&'a ImageSet> {
    let eligible = filter_eligible(sets, context);
    if eligible.is_empty() && !sets.is_empty() {
        debug!(
            pool = sets.len(),
            "contextual filters removed every set, using unfiltered pool"
        );
        return sets.to_vec();
    }
    eligible
}

/// Steer abnormal picks toward sets whose abnormality is on a symptomatic side.
pub fn prefer_symptomatic_side<'a, S: Sampler>(
    candidates: Vec<&'a ImageSet>,
    tag: Tag,
    context: &Context,
    event_id: &str,
    sampler: &S,
) -> Vec<&'a ImageSet> {
    if tag != Tag::Abnormal || context.symptom_sides.is_empty() {
        return candidates;
    }

    let roll = sampler.sample(&format!("{event_id}{SIDE_SUFFIX}"));
    if roll < SOFT_PREFERENCE_SKIP_PROBABILITY {
        return candidates;
    }

    let matching: Vec<&ImageSet> = candidates
        .iter()
        .copied()
        .filter(|set| {
            context
                .symptom_sides
                .iter()
                .any(|side| set.side_status(*side) == Some(SideStatus::Abnormal))
        })
        .collect();

    if matching.is_empty() {
        candidates
    } else {
        matching
    }
}

/// Number of the event's retaken views that the set also defines as a series.
pub fn repeat_score(set: &ImageSet, repeat_views: impl IntoIterator<Item = ViewCode>) -> usize {
    repeat_views
        .into_iter()
        .filter(|view| set.view(*view).is_some_and(|images| images.is_multi()))
        .count()
}

/// Steer picks toward sets whose retake series line up with the event's retakes.
pub fn prefer_repeat_matches<'a, S: Sampler>(
    candidates: Vec<&'a ImageSet>,
    context: &Context,
    event_id: &str,
    sampler: &S,
) -> Vec<&'a ImageSet> {
    if !context.has_repeat || context.repeat_views.is_empty() {
        return candidates;
    }

    let scores: Vec<usize> = candidates
        .iter()
        .map(|set| repeat_score(set, context.repeat_views.iter().copied()))
        .collect();
    let best = scores.iter().copied().max().unwrap_or(0);

    let roll = sampler.sample(&format!("{event_id}{REPEAT_SUFFIX}"));
    if roll >= SOFT_PREFERENCE_SKIP_PROBABILITY || best == 0 {
        return candidates;
    }

    candidates
        .into_iter()
        .zip(scores)
        .filter(|(_, score)| *score == best)
        .map(|(set, _)| set)
        .collect()
}
