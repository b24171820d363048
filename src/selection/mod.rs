pub mod filters;
pub mod prng;
pub mod weights;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::context::Context;
use crate::manifest::ImageSet;
use crate::types::{SetId, Tag};
pub use filters::{
	filter_eligible, filter_eligible_or_all, prefer_repeat_matches, prefer_symptomatic_side,
	repeat_score, SOFT_PREFERENCE_SKIP_PROBABILITY,
};
pub use prng::{sample, seed_value, LcgSampler, Sampler};
pub use weights::{resolve_weights, WeightTable};

/// Outcome of one selection, borrowed from the manifest it was drawn from.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
	pub set: &'a ImageSet,
	pub tag: Tag,
	pub forced: bool,
	/// Size of the list the final index was drawn from.
	pub candidates: usize,
}

impl Selection<'_> {
	pub fn summary(&self) -> SelectionSummary {
		SelectionSummary {
			set_id: self.set.id.clone(),
			tag: self.tag,
			forced: self.forced,
			candidates: self.candidates,
		}
	}
}

/// Owned, serializable record of a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSummary {
	pub set_id: SetId,
	pub tag: Tag,
	pub forced: bool,
	pub candidates: usize,
}

pub struct SetSelector<S> {
	sampler: S,
}

impl Default for SetSelector<LcgSampler> {
	fn default() -> Self {
		Self {
			sampler: LcgSampler,
		}
	}
}

impl<S> SetSelector<S>
where
	S: Sampler,
{
	pub fn new(sampler: S) -> Self {
		Self { sampler }
	}

	pub fn sampler(&self) -> &S {
		&self.sampler
	}

	/// Pick one set for `event_id`. Identical inputs always give the same set.
	///
	/// `eligible` should already have passed the hard filters.
	pub fn select<'a>(
		&self,
		eligible: &[&'a ImageSet],
		weights: &WeightTable,
		event_id: &str,
		forced_tag: Option<Tag>,
		context: &Context,
	) -> Option<Selection<'a>> {
		if eligible.is_empty() {
			return None;
		}

		// 1. Forced tag: uniform pick within that tag, no soft scoring
		if let Some(tag) = forced_tag {
			let tagged: Vec<&ImageSet> = eligible.iter().copied().filter(|s| s.tag == tag).collect();
			if !tagged.is_empty() {
				let index = self.sampler.pick_index(event_id, tagged.len());
				debug!(event_id, %tag, set_id = %tagged[index].id, "forced tag selection");
				return Some(Selection {
					set: tagged[index],
					tag,
					forced: true,
					candidates: tagged.len(),
				});
			}
		}

		// 2. Group by tag
		let mut by_tag: BTreeMap<Tag, Vec<&ImageSet>> = BTreeMap::new();
		for set in eligible.iter().copied() {
			by_tag.entry(set.tag).or_default().push(set);
		}

		// 3. Weighted tag draw
		let tag = self.choose_tag(&by_tag, weights, event_id)?;
		let candidates = by_tag.remove(&tag)?;

		// 4. Soft preferences, side first
		let candidates =
			prefer_symptomatic_side(candidates, tag, context, event_id, &self.sampler);
		let candidates = prefer_repeat_matches(candidates, context, event_id, &self.sampler);

		// 5. Independent draw within the tag
		let index = self
			.sampler
			.pick_index(&format!("{event_id}{}", tag.as_str()), candidates.len());
		let set = candidates[index];

		debug!(
			event_id,
			%tag,
			set_id = %set.id,
			eligible = eligible.len(),
			candidates = candidates.len(),
			"weighted selection"
		);

		Some(Selection {
			set,
			tag,
			forced: false,
			candidates: candidates.len(),
		})
	}

	fn choose_tag(
		&self,
		by_tag: &BTreeMap<Tag, Vec<&ImageSet>>,
		weights: &WeightTable,
		event_id: &str,
	) -> Option<Tag> {
		let live: Vec<(Tag, f64)> = Tag::ALL
			.iter()
			.filter(|tag| by_tag.contains_key(*tag))
			.map(|tag| (*tag, weights.weight(*tag)))
			.filter(|(_, weight)| weight.is_finite() && *weight > 0.0)
			.collect();

		let total: f64 = live.iter().map(|(_, weight)| weight).sum();
		if live.is_empty() || total <= 0.0 {
			// Nothing weighted has sets; take the first populated tag
			return Tag::ALL.iter().copied().find(|tag| by_tag.contains_key(tag));
		}

		let roll = self.sampler.sample(event_id);
		let mut upper = 0.0;
		for (tag, weight) in &live {
			upper += weight / total;
			if roll < upper {
				return Some(*tag);
			}
		}

		live.first().map(|(tag, _)| *tag)
	}
}
