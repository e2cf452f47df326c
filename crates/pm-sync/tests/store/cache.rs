use serde_json::json;

use pm_sync::error::StoreError;
use pm_sync::store::{CacheSnapshot, FileCache, LocalCache, MemoryCache};
use pm_sync::types::Record;

fn record(id: &str, name: &str) -> Record {
    Record::from_json(json!({
        "id": id,
        "name": name,
        "createdAt": "2024-01-01T00:00:00.000Z",
        "updatedAt": "2024-01-01T00:00:00.000Z",
        "client": "Acme"
    }))
    .unwrap()
}

#[test]
fn file_cache_missing_file_loads_none() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FileCache::new(dir.path().join("projects.json"));
    assert_eq!(cache.load().unwrap(), None);
}

#[test]
fn file_cache_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("projects.json");
    let cache = FileCache::new(&path);
    let snapshot = CacheSnapshot {
        records: vec![record("p-1", "One"), record("p-2", "Two")],
        order: vec!["p-2".to_string(), "p-1".to_string()],
    };

    cache.save(&snapshot).unwrap();

    assert_eq!(cache.load().unwrap(), Some(snapshot));
    assert!(!path.with_extension("json.tmp").exists());
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains('\n'), "expected pretty JSON");
}

#[test]
fn file_cache_empty_snapshot_is_not_none() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FileCache::new(dir.path().join("projects.json"));

    cache.save(&CacheSnapshot::default()).unwrap();

    assert_eq!(cache.load().unwrap(), Some(CacheSnapshot::default()));
}

#[test]
fn file_cache_reads_bare_record_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("projects.json");
    std::fs::write(
        &path,
        r#"[{ "id": "p-1", "name": "One", "status": "live" }]"#,
    )
    .unwrap();

    let snapshot = FileCache::new(&path).load().unwrap().unwrap();

    assert_eq!(snapshot.records.len(), 1);
    assert_eq!(snapshot.records[0].name, "One");
    assert!(snapshot.order.is_empty());
}

#[test]
fn file_cache_corrupt_file_is_cache_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("projects.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = FileCache::new(&path).load().unwrap_err();

    match err {
        StoreError::Cache {
            location, source, ..
        } => {
            assert!(location.ends_with("projects.json"));
            assert!(source.is_some());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn memory_cache_round_trip() {
    let cache = MemoryCache::new();
    assert_eq!(cache.load().unwrap(), None);

    let snapshot = CacheSnapshot {
        records: vec![record("p-1", "One")],
        order: Vec::new(),
    };
    cache.save(&snapshot).unwrap();

    assert_eq!(cache.snapshot(), Some(snapshot.clone()));
    assert_eq!(cache.load().unwrap(), Some(snapshot));
}
