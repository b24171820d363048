use std::fs;
use std::path::Path;
use std::sync::Arc;

use image_set_core::manifest::{ManifestCache, ManifestLoader};
use image_set_core::types::SourceKey;
use tempfile::tempdir;

fn write(root: &Path, body: &str) {
    let dir = root.join("diagrams");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("manifest.json"), body).unwrap();
}

#[test]
fn unchanged_document_is_served_from_cache() {
    let dir = tempdir().unwrap();
    write(dir.path(), r#"{ "sets": [ { "id": "a", "tag": "normal" } ] }"#);

    let loader = ManifestLoader::new(dir.path());
    let cache = ManifestCache::new();
    let source = SourceKey::parse("diagrams").unwrap();

    assert!(cache.is_empty());
    let first = cache.get_or_load(&loader, &source).unwrap();
    let second = cache.get_or_load(&loader, &source).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
    assert!(cache.loaded_at(&source).is_some());
}

#[test]
fn changed_document_is_reloaded() {
    let dir = tempdir().unwrap();
    write(dir.path(), r#"{ "sets": [ { "id": "a", "tag": "normal" } ] }"#);

    let loader = ManifestLoader::new(dir.path());
    let cache = ManifestCache::new();
    let source = SourceKey::parse("diagrams").unwrap();

    let before = cache.get_or_load(&loader, &source).unwrap();
    write(
        dir.path(),
        r#"{ "sets": [ { "id": "a", "tag": "normal" }, { "id": "b", "tag": "abnormal" } ] }"#,
    );
    let after = cache.get_or_load(&loader, &source).unwrap();

    assert_eq!(before.sets().len(), 1);
    assert_eq!(after.sets().len(), 2);
    assert_ne!(before.version, after.version);
}

#[test]
fn missing_or_broken_document_evicts_entry() {
    let dir = tempdir().unwrap();
    write(dir.path(), r#"{ "sets": [] }"#);

    let loader = ManifestLoader::new(dir.path());
    let cache = ManifestCache::new();
    let source = SourceKey::parse("diagrams").unwrap();

    cache.get_or_load(&loader, &source).unwrap();
    assert_eq!(cache.len(), 1);

    write(dir.path(), "{ broken");
    assert!(cache.get_or_load(&loader, &source).is_err());
    assert!(cache.is_empty());

    write(dir.path(), r#"{ "sets": [] }"#);
    cache.get_or_load(&loader, &source).unwrap();
    fs::remove_file(dir.path().join("diagrams/manifest.json")).unwrap();
    let err = cache.get_or_load(&loader, &source).unwrap_err();
    assert!(err.is_missing());
    assert!(cache.loaded_at(&source).is_none());
}
