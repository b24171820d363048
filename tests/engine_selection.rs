use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use image_set_core::context::EventRecord;
use image_set_core::engine::{ImageSetEngine, ListOptions, SelectionOptions};
use image_set_core::selection::WeightTable;
use image_set_core::types::Tag;
use image_set_core::EngineConfig;
use serde_json::json;
use sha2::{Digest, Sha256};
use tempfile::tempdir;

fn write_manifest(root: &Path, source: &str, manifest: &serde_json::Value) {
    let dir = root.join(source);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("manifest.json"),
        serde_json::to_vec_pretty(manifest).unwrap(),
    )
    .unwrap();
}

fn engine(root: &Path) -> ImageSetEngine {
    ImageSetEngine::new(EngineConfig::new(root)).unwrap()
}

fn catalog() -> serde_json::Value {
    json!({
        "sets": [
            { "id": "normal-1", "tag": "normal" },
            { "id": "normal-2", "tag": "normal" },
            { "id": "normal-3", "tag": "normal" },
            { "id": "abnormal-1", "tag": "abnormal", "left": { "status": "abnormal" } },
            { "id": "abnormal-2", "tag": "abnormal", "right": { "status": "abnormal" } },
            { "id": "indeterminate-1", "tag": "indeterminate" },
            { "id": "technical-1", "tag": "technical" },
            { "id": "implants-normal", "tag": "normal", "hasImplants": true },
            { "id": "implants-abnormal", "tag": "abnormal", "hasImplants": true },
            { "id": "retired", "tag": "normal", "disabled": true }
        ]
    })
}

fn event_id(i: usize) -> String {
    hex::encode(Sha256::digest(format!("event-{i}").as_bytes()))
}

fn implant_event() -> EventRecord {
    serde_json::from_value(json!({
        "medicalHistory": { "breastImplants": [ { "removed": false } ] }
    }))
    .unwrap()
}

#[test]
fn selection_is_deterministic_across_calls_and_engines() {
    let dir = tempdir().unwrap();
    write_manifest(dir.path(), "diagrams", &catalog());

    let first = engine(dir.path());
    let second = engine(dir.path());
    let options = SelectionOptions::default();

    for i in 0..200 {
        let id = event_id(i);
        let a = first.get_image_set_for_event(&id, "diagrams", &options).unwrap();
        let b = first.get_image_set_for_event(&id, "diagrams", &options).unwrap();
        let c = second.get_image_set_for_event(&id, "diagrams", &options).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.id, c.id);
    }
}

#[test]
fn disabled_sets_are_never_selected_but_remain_addressable() {
    let dir = tempdir().unwrap();
    write_manifest(dir.path(), "diagrams", &catalog());
    let engine = engine(dir.path());

    for i in 0..1_000 {
        let set = engine
            .get_image_set_for_event(&event_id(i), "diagrams", &SelectionOptions::default())
            .unwrap();
        assert!(!set.disabled);
        assert_ne!(set.id.as_str(), "retired");
    }

    let retired = engine.get_set_by_id("retired", "diagrams").unwrap();
    assert!(retired.disabled);
    assert!(engine.get_set_by_id("nope", "diagrams").is_none());
}

#[test]
fn tag_distribution_converges_to_configured_weights() {
    let dir = tempdir().unwrap();
    write_manifest(dir.path(), "diagrams", &catalog());
    let engine = engine(dir.path());
    let options = SelectionOptions::default();
    let expected = WeightTable::default_screening();

    let samples = 10_000;
    let mut counts: BTreeMap<Tag, usize> = BTreeMap::new();
    for i in 0..samples {
        let set = engine
            .get_image_set_for_event(&event_id(i), "diagrams", &options)
            .unwrap();
        *counts.entry(set.tag).or_default() += 1;
    }

    for tag in Tag::ALL {
        let observed = counts.get(&tag).copied().unwrap_or(0) as f64 / samples as f64;
        let target = expected.weight(tag);
        assert!(
            (observed - target).abs() <= 0.03,
            "{tag}: observed {observed:.4}, expected {target:.4}"
        );
    }
}

#[test]
fn override_weights_steer_tag_choice() {
    let dir = tempdir().unwrap();
    write_manifest(dir.path(), "diagrams", &catalog());
    let engine = engine(dir.path());
    let options = SelectionOptions::default()
        .with_weights(WeightTable::new().with(Tag::Technical, 1.0));

    for i in 0..200 {
        let set = engine
            .get_image_set_for_event(&event_id(i), "diagrams", &options)
            .unwrap();
        assert_eq!(set.id.as_str(), "technical-1");
    }
}

#[test]
fn configured_weights_apply_without_context() {
    let dir = tempdir().unwrap();
    write_manifest(dir.path(), "diagrams", &catalog());
    let config = EngineConfig {
        weights: Some(WeightTable::new().with(Tag::Indeterminate, 1.0)),
        ..EngineConfig::new(dir.path())
    };
    let engine = ImageSetEngine::new(config).unwrap();

    let set = engine
        .get_image_set_for_event("evt-1", "diagrams", &SelectionOptions::default())
        .unwrap();
    assert_eq!(set.tag, Tag::Indeterminate);
}

#[test]
fn implant_events_only_get_implant_sets() {
    let dir = tempdir().unwrap();
    write_manifest(dir.path(), "diagrams", &catalog());
    let engine = engine(dir.path());
    let options = SelectionOptions::for_event(implant_event());

    for i in 0..500 {
        let set = engine
            .get_image_set_for_event(&event_id(i), "diagrams", &options)
            .unwrap();
        assert!(set.has_implants, "{} lacks implants", set.id);
    }
}

#[test]
fn non_implant_events_never_get_implant_sets() {
    let dir = tempdir().unwrap();
    write_manifest(dir.path(), "diagrams", &catalog());
    let engine = engine(dir.path());

    for i in 0..500 {
        let set = engine
            .get_image_set_for_event(&event_id(i), "diagrams", &SelectionOptions::default())
            .unwrap();
        assert!(!set.has_implants);
    }
}

#[test]
fn over_constrained_context_still_selects_a_set() {
    let dir = tempdir().unwrap();
    write_manifest(
        dir.path(),
        "photos",
        &json!({ "sets": [ { "id": "p1", "tag": "normal" }, { "id": "p2", "tag": "abnormal" } ] }),
    );
    let engine = engine(dir.path());
    let event: EventRecord = serde_json::from_value(json!({
        "medicalHistory": { "breastImplants": [ {} ] },
        "imaging": { "extraImagesTaken": true, "views": { "rcc": { "count": 2 } } }
    }))
    .unwrap();

    let set = engine.get_image_set_for_event("evt-99", "photos", &SelectionOptions::for_event(event));
    assert!(set.is_some());
}

#[test]
fn forced_tag_is_honoured_through_engine() {
    let dir = tempdir().unwrap();
    write_manifest(dir.path(), "diagrams", &catalog());
    let engine = engine(dir.path());
    let options = SelectionOptions::default().with_forced_tag(Tag::Abnormal);

    for i in 0..100 {
        let set = engine
            .get_image_set_for_event(&event_id(i), "diagrams", &options)
            .unwrap();
        assert_eq!(set.tag, Tag::Abnormal);
        assert!(!set.has_implants);
    }
}

#[test]
fn unavailable_catalog_degrades_to_empty() {
    let dir = tempdir().unwrap();
    let engine = engine(dir.path());
    let options = SelectionOptions::default();

    assert!(engine.get_available_sets("diagrams", ListOptions::default()).is_empty());
    assert!(engine.get_image_set_for_event("evt-1", "diagrams", &options).is_none());
    assert!(engine.get_images_for_event("evt-1", "diagrams", &options).is_none());
    assert!(engine.get_image_paths("set-1", "diagrams").is_none());
    assert!(engine.get_set_by_id("set-1", "diagrams").is_none());
    assert!(!engine.has_image_sets("diagrams"));
}

#[test]
fn corrupt_manifest_is_treated_as_unavailable() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("diagrams")).unwrap();
    fs::write(dir.path().join("diagrams/manifest.json"), "{ not json").unwrap();
    let engine = engine(dir.path());

    assert!(engine.get_available_sets("diagrams", ListOptions::default()).is_empty());
    assert!(engine
        .get_image_set_for_event("evt-1", "diagrams", &SelectionOptions::default())
        .is_none());
}

#[test]
fn hostile_source_keys_are_rejected() {
    let dir = tempdir().unwrap();
    write_manifest(dir.path(), "diagrams", &catalog());
    let engine = engine(dir.path());

    assert!(engine.load_manifest("../diagrams").is_none());
    assert!(!engine.has_image_sets("diagrams/.."));
    assert!(engine.has_image_sets("diagrams"));
}

#[test]
fn available_sets_respect_include_disabled() {
    let dir = tempdir().unwrap();
    write_manifest(dir.path(), "diagrams", &catalog());
    let engine = engine(dir.path());

    let enabled = engine.get_available_sets("diagrams", ListOptions::default());
    let all = engine.get_available_sets(
        "diagrams",
        ListOptions {
            include_disabled: true,
        },
    );
    assert_eq!(enabled.len(), 9);
    assert_eq!(all.len(), 10);
}

#[test]
fn sources_are_independent() {
    let dir = tempdir().unwrap();
    write_manifest(dir.path(), "diagrams", &json!({ "sets": [ { "id": "shared", "tag": "normal" } ] }));
    write_manifest(dir.path(), "photos", &json!({ "sets": [ { "id": "shared", "tag": "technical" } ] }));
    let engine = engine(dir.path());

    assert_eq!(engine.get_set_by_id("shared", "diagrams").unwrap().tag, Tag::Normal);
    assert_eq!(engine.get_set_by_id("shared", "photos").unwrap().tag, Tag::Technical);
}

#[test]
fn only_disabled_sets_means_no_image_sets() {
    let dir = tempdir().unwrap();
    write_manifest(
        dir.path(),
        "diagrams",
        &json!({ "sets": [ { "id": "off", "tag": "normal", "disabled": true } ] }),
    );
    let engine = engine(dir.path());
    assert!(!engine.has_image_sets("diagrams"));
    assert!(engine
        .get_image_set_for_event("evt-1", "diagrams", &SelectionOptions::default())
        .is_none());
}

#[test]
fn manifest_changes_are_seen_on_next_call() {
    let dir = tempdir().unwrap();
    write_manifest(dir.path(), "diagrams", &json!({ "sets": [ { "id": "old", "tag": "normal" } ] }));

    for cache_manifests in [false, true] {
        let config = EngineConfig {
            cache_manifests,
            ..EngineConfig::new(dir.path())
        };
        let engine = ImageSetEngine::new(config).unwrap();
        write_manifest(dir.path(), "diagrams", &json!({ "sets": [ { "id": "old", "tag": "normal" } ] }));
        let before = engine
            .get_image_set_for_event("evt-1", "diagrams", &SelectionOptions::default())
            .unwrap();
        assert_eq!(before.id.as_str(), "old");

        write_manifest(
            dir.path(),
            "diagrams",
            &json!({ "sets": [ { "id": "replacement-set", "tag": "normal" } ] }),
        );
        let after = engine
            .get_image_set_for_event("evt-1", "diagrams", &SelectionOptions::default())
            .unwrap();
        assert_eq!(after.id.as_str(), "replacement-set", "cache_manifests = {cache_manifests}");

        fs::remove_file(dir.path().join("diagrams/manifest.json")).unwrap();
        assert!(!engine.has_image_sets("diagrams"));
    }
}
