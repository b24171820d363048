use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::EngineConfig;
use crate::manifest::{ImageSet, Manifest, ViewDefinition, ViewImages};
use crate::types::ViewCode;

/// Sub-directory of a source holding library images.
pub const LIBRARY_DIR_NAME: &str = "library";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Unknown set: {0}")]
    UnknownSet(String),
    #[error("Set {set} does not define view {view}")]
    ViewNotDefined { set: String, view: ViewCode },
    #[error("Delegation from set {set} for view {view} exceeds depth {limit}")]
    DepthExceeded {
        set: String,
        view: ViewCode,
        limit: usize,
    },
}

/// Resolved media for one view: a single path, or a retake series oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ViewPaths {
    Single(String),
    Sequence(Vec<String>),
}

impl ViewPaths {
    fn from_vec(mut paths: Vec<String>) -> Option<Self> {
        match paths.len() {
            0 => None,
            1 => paths.pop().map(ViewPaths::Single),
            _ => Some(ViewPaths::Sequence(paths)),
        }
    }

    /// Most recent image.
    pub fn latest(&self) -> &str {
        match self {
            ViewPaths::Single(path) => path,
            ViewPaths::Sequence(paths) => paths.last().map(String::as_str).unwrap_or_default(),
        }
    }

    pub fn all(&self) -> &[String] {
        match self {
            ViewPaths::Single(path) => std::slice::from_ref(path),
            ViewPaths::Sequence(paths) => paths,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, ViewPaths::Sequence(paths) if paths.len() > 1)
    }
}

pub type ViewPathMap = BTreeMap<ViewCode, ViewPaths>;

/// Where media lives on disk and how it is addressed publicly.
#[derive(Debug, Clone)]
pub struct MediaLayout {
    pub catalog_root: PathBuf,
    pub public_prefix: String,
    pub default_extension: String,
}

impl MediaLayout {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            catalog_root: config.catalog_root.clone(),
            public_prefix: config.public_prefix.trim_end_matches('/').to_string(),
            default_extension: config.default_extension.clone(),
        }
    }

    pub fn library_path(&self, source: &str, image: &str) -> String {
        format!("{}/{source}/{LIBRARY_DIR_NAME}/{image}", self.public_prefix)
    }

    pub fn set_file_path(&self, source: &str, set_id: &str, file: &str) -> String {
        format!("{}/{source}/{set_id}/{file}", self.public_prefix)
    }

    pub fn set_dir(&self, source: &str, set_id: &str) -> PathBuf {
        self.catalog_root.join(source).join(set_id)
    }
}

/// File listing of a standard set's folder.
#[derive(Debug, Clone)]
pub struct SetFolder {
    pub extension: String,
    files: BTreeSet<String>,
}

impl SetFolder {
    /// List `dir` and detect the extension from the first view file found.
    /// A missing or unreadable folder yields the fallback extension.
    pub fn scan(dir: &Path, fallback_extension: &str) -> Self {
        let mut names: Vec<String> = fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .filter(|entry| entry.path().is_file())
                    .filter_map(|entry| entry.file_name().into_string().ok())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();

        let extension = names
            .iter()
            .filter_map(|name| {
                let path = Path::new(name);
                let stem = path.file_stem()?.to_str()?;
                let ext = path.extension()?.to_str()?;
                is_view_stem(stem).then(|| ext.to_string())
            })
            .next()
            .unwrap_or_else(|| fallback_extension.to_string());

        Self {
            extension,
            files: names.into_iter().collect(),
        }
    }

    /// File names for `view`: `<view>.<ext>`, else the numbered series
    /// `<view>-1.<ext>`, `<view>-2.<ext>`, ..., else the conventional name.
    pub fn view_files(&self, view: ViewCode) -> Vec<String> {
        let plain = format!("{view}.{}", self.extension);
        if self.files.contains(&plain) {
            return vec![plain];
        }

        let series: Vec<String> = (1..)
            .map(|n| format!("{view}-{n}.{}", self.extension))
            .take_while(|name| self.files.contains(name))
            .collect();
        if series.is_empty() {
            vec![plain]
        } else {
            series
        }
    }
}

fn is_view_stem(stem: &str) -> bool {
    let stem = stem.to_lowercase();
    ViewCode::ALL.iter().any(|view| {
        let code = view.as_str();
        stem == code
            || stem
                .strip_prefix(code)
                .and_then(|rest| rest.strip_prefix('-'))
                .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
    })
}

/// Resolves set ids into per-view media paths within one manifest.
pub struct PathResolver<'a> {
    manifest: &'a Manifest,
    layout: &'a MediaLayout,
    max_depth: usize,
}

impl<'a> PathResolver<'a> {
    pub fn new(manifest: &'a Manifest, layout: &'a MediaLayout, max_depth: usize) -> Self {
        Self {
            manifest,
            layout,
            max_depth,
        }
    }

    /// `None` when the set is unknown. Views that fail to resolve are left out.
    pub fn resolve_set(&self, set_id: &str) -> Option<ViewPathMap> {
        let set = self.manifest.get(set_id)?;
        Some(self.resolve(set))
    }

    pub fn resolve(&self, set: &ImageSet) -> ViewPathMap {
        let Some(views) = &set.views else {
            return self.standard_paths(set);
        };

        let mut resolved = ViewPathMap::new();
        for (view, images) in views {
            match self.resolve_images(set, *view, images, 0) {
                Ok(paths) => {
                    resolved.insert(*view, paths);
                }
                Err(e) => warn!(
                    source = %self.manifest.source,
                    set_id = %set.id,
                    %view,
                    error = %e,
                    "view could not be resolved"
                ),
            }
        }
        resolved
    }

    /// Resolve one view of one set, following delegations.
    pub fn resolve_view(&self, set: &ImageSet, view: ViewCode) -> Result<ViewPaths, ResolveError> {
        self.resolve_view_at(set, view, 0)
    }

    fn resolve_view_at(
        &self,
        set: &ImageSet,
        view: ViewCode,
        depth: usize,
    ) -> Result<ViewPaths, ResolveError> {
        match &set.views {
            Some(views) => {
                let images = views.get(&view).ok_or_else(|| ResolveError::ViewNotDefined {
                    set: set.id.as_str().to_string(),
                    view,
                })?;
                self.resolve_images(set, view, images, depth)
            }
            None => {
                let folder = self.scan(set);
                Ok(self.folder_paths(set, &folder, view))
            }
        }
    }

    fn resolve_images(
        &self,
        set: &ImageSet,
        view: ViewCode,
        images: &ViewImages,
        depth: usize,
    ) -> Result<ViewPaths, ResolveError> {
        let paths = images
            .definitions()
            .iter()
            .map(|def| self.resolve_definition(set, view, def, depth))
            .collect::<Result<Vec<_>, _>>()?;

        ViewPaths::from_vec(paths).ok_or_else(|| ResolveError::ViewNotDefined {
            set: set.id.as_str().to_string(),
            view,
        })
    }

    fn resolve_definition(
        &self,
        set: &ImageSet,
        view: ViewCode,
        def: &ViewDefinition,
        depth: usize,
    ) -> Result<String, ResolveError> {
        match def {
            ViewDefinition::Image(image) => {
                Ok(self.layout.library_path(self.manifest.source.as_str(), image))
            }
            ViewDefinition::Delegated(target_id) => {
                if depth >= self.max_depth {
                    return Err(ResolveError::DepthExceeded {
                        set: set.id.as_str().to_string(),
                        view,
                        limit: self.max_depth,
                    });
                }
                let target = self
                    .manifest
                    .get_by_id(target_id)
                    .ok_or_else(|| ResolveError::UnknownSet(target_id.as_str().to_string()))?;

                // Delegation always lands on the latest retake
                let paths = self.resolve_view_at(target, view, depth + 1)?;
                Ok(paths.latest().to_string())
            }
        }
    }

    fn scan(&self, set: &ImageSet) -> SetFolder {
        let dir = self
            .layout
            .set_dir(self.manifest.source.as_str(), set.id.as_str());
        SetFolder::scan(&dir, &self.layout.default_extension)
    }

    fn standard_paths(&self, set: &ImageSet) -> ViewPathMap {
        let folder = self.scan(set);
        ViewCode::ALL
            .iter()
            .map(|view| (*view, self.folder_paths(set, &folder, *view)))
            .collect()
    }

    fn folder_paths(&self, set: &ImageSet, folder: &SetFolder, view: ViewCode) -> ViewPaths {
        let source = self.manifest.source.as_str();
        let paths: Vec<String> = folder
            .view_files(view)
            .iter()
            .map(|file| self.layout.set_file_path(source, set.id.as_str(), file))
            .collect();
        ViewPaths::from_vec(paths).unwrap_or_else(|| {
            let conventional = format!("{view}.{}", folder.extension);
            ViewPaths::Single(self.layout.set_file_path(source, set.id.as_str(), &conventional))
        })
    }
}
