use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{SetId, Side, SideStatus, Tag, ViewCode};

/// One catalogued bundle of per-view images, the unit of selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSet {
    pub id: SetId,
    pub tag: Tag,

    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub has_implants: bool,
    #[serde(default)]
    pub has_extra_images: bool,
    #[serde(default)]
    pub has_repeat: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<BreastDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<BreastDescriptor>,

    /// Present only on composite sets. Standard sets derive their paths
    /// from the folder-per-set layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<BTreeMap<ViewCode, ViewImages>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<AnnotationSource>,
}

impl ImageSet {
    pub fn is_composite(&self) -> bool {
        self.views.is_some()
    }

    pub fn side(&self, side: Side) -> Option<&BreastDescriptor> {
        match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }
    }

    pub fn side_status(&self, side: Side) -> Option<SideStatus> {
        self.side(side).and_then(|d| d.status)
    }

    /// Explicit definition for one view, if this is a composite set that defines it.
    pub fn view(&self, view: ViewCode) -> Option<&ViewImages> {
        self.views.as_ref().and_then(|views| views.get(&view))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BreastDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SideStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finding: Option<String>,
}

/// Where a single view image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawViewDefinition", into = "RawViewDefinition")]
pub enum ViewDefinition {
    /// Library image identifier.
    Image(String),
    /// Same view code, resolved against another set.
    Delegated(SetId),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawViewDefinition {
    Bare(String),
    Image { image: String },
    Delegated { from: SetId },
}

impl From<RawViewDefinition> for ViewDefinition {
    fn from(raw: RawViewDefinition) -> Self {
        match raw {
            RawViewDefinition::Bare(image) | RawViewDefinition::Image { image } => {
                ViewDefinition::Image(image)
            }
            RawViewDefinition::Delegated { from } => ViewDefinition::Delegated(from),
        }
    }
}

impl From<ViewDefinition> for RawViewDefinition {
    fn from(def: ViewDefinition) -> Self {
        match def {
            ViewDefinition::Image(image) => RawViewDefinition::Bare(image),
            ViewDefinition::Delegated(from) => RawViewDefinition::Delegated { from },
        }
    }
}

/// A view is either one image or a retake series, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawViewImages", into = "RawViewImages")]
pub enum ViewImages {
    Single(ViewDefinition),
    Sequence(Vec<ViewDefinition>),
}

impl ViewImages {
    pub fn is_multi(&self) -> bool {
        matches!(self, ViewImages::Sequence(defs) if defs.len() > 1)
    }

    pub fn definitions(&self) -> &[ViewDefinition] {
        match self {
            ViewImages::Single(def) => std::slice::from_ref(def),
            ViewImages::Sequence(defs) => defs,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawViewImages {
    Many(Vec<ViewDefinition>),
    One(ViewDefinition),
}

impl TryFrom<RawViewImages> for ViewImages {
    type Error = String;

    fn try_from(raw: RawViewImages) -> Result<Self, Self::Error> {
        match raw {
            RawViewImages::One(def) => Ok(ViewImages::Single(def)),
            RawViewImages::Many(mut defs) => match defs.len() {
                0 => Err("view image sequence must not be empty".to_string()),
                1 => Ok(ViewImages::Single(defs.remove(0))),
                _ => Ok(ViewImages::Sequence(defs)),
            },
        }
    }
}

impl From<ViewImages> for RawViewImages {
    fn from(images: ViewImages) -> Self {
        match images {
            ViewImages::Single(def) => RawViewImages::One(def),
            ViewImages::Sequence(defs) => RawViewImages::Many(defs),
        }
    }
}

/// Inline annotations, or a pointer to the set that owns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationSource {
    Inline(Vec<Annotation>),
    Delegated { from: SetId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub abnormality: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concern: Option<u8>,
    /// Normalized coordinates in `[0, 1]`, keyed by view.
    #[serde(default)]
    pub positions: BTreeMap<ViewCode, Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let shape = Option::<OneOrMany>::deserialize(deserializer)?;
    Ok(match shape {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
    })
}
