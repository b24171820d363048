use std::fs;
use std::path::Path;

use image_set_core::engine::ImageSetEngine;
use image_set_core::manifest::{ImageSet, Manifest};
use image_set_core::resolve::resolved_annotations;
use image_set_core::types::SourceKey;
use image_set_core::EngineConfig;
use serde_json::json;
use tempfile::tempdir;

fn manifest(value: serde_json::Value) -> Manifest {
    let bytes = serde_json::to_vec(&value).unwrap();
    Manifest::from_slice(SourceKey::parse("diagrams").unwrap(), &bytes).unwrap()
}

fn catalog() -> serde_json::Value {
    json!({
        "sets": [
            { "id": "owner", "tag": "abnormal", "annotations": [
                { "side": "right", "abnormality": ["mass", "calcification"], "concern": 5,
                  "positions": { "rcc": { "x": 0.3, "y": 0.4 }, "rmlo": { "x": 0.35, "y": 0.5 } } }
            ] },
            { "id": "borrower", "tag": "abnormal", "annotations": { "from": "owner" } },
            { "id": "second-hand", "tag": "abnormal", "annotations": { "from": "borrower" } },
            { "id": "dangling", "tag": "abnormal", "annotations": { "from": "ghost" } },
            { "id": "cycle-a", "tag": "abnormal", "annotations": { "from": "cycle-b" } },
            { "id": "cycle-b", "tag": "abnormal", "annotations": { "from": "cycle-a" } },
            { "id": "empty", "tag": "normal", "annotations": [] },
            { "id": "bare", "tag": "normal" }
        ]
    })
}

#[test]
fn inline_annotations_are_returned_directly() {
    let manifest = manifest(catalog());
    let owner = manifest.get("owner").unwrap();
    let annotations = resolved_annotations(&manifest, owner, 8);
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].abnormality, vec!["mass", "calcification"]);
    assert_eq!(annotations[0].positions.len(), 2);
}

#[test]
fn delegated_annotations_follow_chains() {
    let manifest = manifest(catalog());
    for id in ["borrower", "second-hand"] {
        let set = manifest.get(id).unwrap();
        let annotations = resolved_annotations(&manifest, set, 8);
        assert_eq!(annotations.len(), 1, "{id}");
        assert_eq!(annotations[0].concern, Some(5));
    }

    // One hop allowed: second-hand needs two
    let second_hand = manifest.get("second-hand").unwrap();
    assert!(resolved_annotations(&manifest, second_hand, 1).is_empty());
}

#[test]
fn broken_delegations_resolve_to_empty() {
    let manifest = manifest(catalog());
    for id in ["dangling", "cycle-a", "empty", "bare"] {
        let set = manifest.get(id).unwrap();
        assert!(resolved_annotations(&manifest, set, 8).is_empty(), "{id}");
    }
}

fn write_catalog(root: &Path) {
    let dir = root.join("diagrams");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("manifest.json"), serde_json::to_vec(&catalog()).unwrap()).unwrap();
}

#[test]
fn engine_resolves_annotations_against_source() {
    let dir = tempdir().unwrap();
    write_catalog(dir.path());
    let engine = ImageSetEngine::new(EngineConfig::new(dir.path())).unwrap();

    let borrower = engine.get_set_by_id("borrower", "diagrams").unwrap();
    assert_eq!(engine.get_resolved_annotations(&borrower, "diagrams").len(), 1);

    // Pointer can't be followed without a catalog
    assert!(engine.get_resolved_annotations(&borrower, "photos").is_empty());

    let owner: ImageSet = engine.get_set_by_id("owner", "diagrams").unwrap();
    assert_eq!(engine.get_resolved_annotations(&owner, "photos").len(), 1);
}
