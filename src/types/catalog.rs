use serde::{Deserialize, Serialize};
use std::fmt;

/// Clinical category of a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Normal,
    Abnormal,
    Indeterminate,
    Technical,
}

impl Tag {
    /// Fixed iteration order used when building cumulative ranges.
    pub const ALL: [Tag; 4] = [Tag::Normal, Tag::Abnormal, Tag::Indeterminate, Tag::Technical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Normal => "normal",
            Tag::Abnormal => "abnormal",
            Tag::Indeterminate => "indeterminate",
            Tag::Technical => "technical",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the four standard mammography views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewCode {
    Rcc,
    Lcc,
    Rmlo,
    Lmlo,
}

impl ViewCode {
    pub const ALL: [ViewCode; 4] = [ViewCode::Rcc, ViewCode::Lcc, ViewCode::Rmlo, ViewCode::Lmlo];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewCode::Rcc => "rcc",
            ViewCode::Lcc => "lcc",
            ViewCode::Rmlo => "rmlo",
            ViewCode::Lmlo => "lmlo",
        }
    }

    pub fn side(&self) -> Side {
        match self {
            ViewCode::Rcc | ViewCode::Rmlo => Side::Right,
            ViewCode::Lcc | ViewCode::Lmlo => Side::Left,
        }
    }
}

impl fmt::Display for ViewCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Per-breast status recorded on a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideStatus {
    Normal,
    Abnormal,
    Technical,
}
