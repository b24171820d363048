//! Event record supplied by the surrounding clinic workflow.
//!
//! Only the fields the engine reads are modelled; anything else in the
//! record is ignored on deserialization. Form-driven fields arrive in loose
//! shapes (a checkbox may be `true`, `"true"` or `["true"]`), so flags are
//! normalized to `bool` here, once, at the boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::ViewCode;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventRecord {
    pub id: Option<String>,
    pub symptoms: Vec<SymptomEntry>,
    pub medical_history: MedicalHistory,
    pub imaging: Option<ImagingRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SymptomEntry {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Breast location, e.g. `"right breast"` or `"both breasts"`.
    pub location: Option<String>,
    pub nipple_location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalHistory {
    pub breast_implants: Vec<ImplantEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImplantEntry {
    #[serde(deserialize_with = "deserialize_flag")]
    pub removed: bool,
}

/// What was actually captured at the appointment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImagingRecord {
    pub views: BTreeMap<ViewCode, ViewCapture>,
    #[serde(deserialize_with = "deserialize_flag")]
    pub imperfect_but_best_possible: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    pub extra_images_taken: bool,
}

impl ImagingRecord {
    pub fn is_captured(&self, view: ViewCode) -> bool {
        self.views.get(&view).is_some_and(|capture| capture.count > 0)
    }

    pub fn retaken_views(&self) -> impl Iterator<Item = ViewCode> + '_ {
        self.views
            .iter()
            .filter(|(_, capture)| capture.is_retake())
            .map(|(view, _)| *view)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCapture {
    #[serde(default = "default_capture_count")]
    pub count: u32,
}

impl ViewCapture {
    pub fn new(count: u32) -> Self {
        Self { count }
    }

    pub fn is_retake(&self) -> bool {
        self.count > 1
    }
}

impl Default for ViewCapture {
    fn default() -> Self {
        Self::new(default_capture_count())
    }
}

fn default_capture_count() -> u32 {
    1
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagShape {
    Bool(bool),
    Text(String),
    Many(Vec<FlagShape>),
}

impl FlagShape {
    fn is_set(&self) -> bool {
        match self {
            FlagShape::Bool(value) => *value,
            FlagShape::Text(text) => matches!(text.trim().to_lowercase().as_str(), "true" | "yes"),
            FlagShape::Many(values) => values.iter().any(FlagShape::is_set),
        }
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let shape = Option::<FlagShape>::deserialize(deserializer)?;
    Ok(shape.is_some_and(|shape| shape.is_set()))
}
