use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::types::Tag;

/// Tag → non-negative weight. Need not sum to 1; selection normalizes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable {
    inner: BTreeMap<Tag, f64>,
}

impl WeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tag: Tag, weight: f64) -> Self {
        self.inner.insert(tag, weight);
        self
    }

    pub fn insert(&mut self, tag: Tag, weight: f64) {
        self.inner.insert(tag, weight);
    }

    /// Weight for `tag`; absent tags weigh nothing.
    pub fn weight(&self, tag: Tag) -> f64 {
        self.inner.get(&tag).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.inner.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Tag, &f64)> {
        self.inner.iter()
    }

    pub fn is_valid(&self) -> bool {
        self.inner.values().all(|w| w.is_finite() && *w >= 0.0)
    }

    fn fixed(normal: f64, abnormal: f64, indeterminate: f64, technical: f64) -> Self {
        Self::new()
            .with(Tag::Normal, normal)
            .with(Tag::Abnormal, abnormal)
            .with(Tag::Indeterminate, indeterminate)
            .with(Tag::Technical, technical)
    }

    /// No symptoms, clean capture.
    pub fn default_screening() -> Self {
        Self::fixed(0.70, 0.15, 0.10, 0.05)
    }

    pub fn symptoms() -> Self {
        Self::fixed(0.40, 0.40, 0.15, 0.05)
    }

    pub fn imperfect() -> Self {
        Self::fixed(0.50, 0.10, 0.10, 0.30)
    }

    pub fn symptoms_and_imperfect() -> Self {
        Self::fixed(0.30, 0.35, 0.10, 0.25)
    }
}

/// Pick the weight table for an event.
///
/// Precedence, highest first: caller override, symptoms with imperfect
/// capture, symptoms, imperfect capture, configured table, built-in default.
pub fn resolve_weights(
    context: &Context,
    override_weights: Option<&WeightTable>,
    configured: Option<&WeightTable>,
) -> WeightTable {
    if let Some(weights) = override_weights {
        return weights.clone();
    }

    match (context.has_symptoms, context.is_imperfect) {
        (true, true) => WeightTable::symptoms_and_imperfect(),
        (true, false) => WeightTable::symptoms(),
        (false, true) => WeightTable::imperfect(),
        (false, false) => configured
            .cloned()
            .unwrap_or_else(WeightTable::default_screening),
    }
}
