//! Bulk replace, JSON import and export.

use serde_json::json;

use pm_sync::error::{PmSyncError, SyncError};
use pm_sync::remote::RemoteError;
use pm_sync::{AttrValue, Record};

use super::support::*;

fn without_updated_at(records: Vec<Record>) -> Vec<Record> {
    records
        .into_iter()
        .map(|mut r| {
            r.updated_at.clear();
            r
        })
        .collect()
}

#[tokio::test]
async fn export_then_import_round_trips() {
    let store = TestStore::new();
    let source = coordinator(&store);
    source
        .create(patch(json!({
            "name": "Alpha",
            "client": "Acme",
            "teamMembers": [{ "name": "Ana", "role": "lead" }]
        })))
        .await
        .unwrap();
    source.create(named("Beta")).await.unwrap();
    let exported = source.export_collection().unwrap();

    let target = coordinator(&TestStore::new());
    let count = target.import_json(&exported).await.unwrap();

    assert_eq!(count, 2);
    assert_eq!(
        without_updated_at(target.list()),
        without_updated_at(source.list())
    );
}

#[tokio::test]
async fn export_is_a_pretty_json_array() {
    let store = TestStore::new();
    let c = coordinator(&store);
    c.create(named("Alpha")).await.unwrap();

    let exported = c.export_collection().unwrap();
    let value: serde_json::Value = serde_json::from_str(&exported).unwrap();

    assert!(exported.contains('\n'));
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], json!("Alpha"));
    assert!(items[0]["createdAt"].is_string());
}

#[tokio::test]
async fn import_json_rejects_non_array() {
    let store = TestStore::new();
    let c = coordinator(&store);
    c.create(named("Keep")).await.unwrap();

    let err = c.import_json(r#"{ "projects": [] }"#).await.unwrap_err();
    assert!(matches!(err, PmSyncError::Validation(ref v) if v.message == "expected an array of records"));

    let err = c.import_json("not json").await.unwrap_err();
    assert!(matches!(err, PmSyncError::Serialization(_)));

    assert_eq!(names(&c.list()), vec!["Keep"]);
}

#[tokio::test]
async fn import_rejects_duplicate_and_empty_ids() {
    let store = TestStore::new();
    let c = coordinator(&store);

    let dup = vec![remote_record("p-1", "A"), remote_record("p-1", "B")];
    let err = c.import_collection(dup).await.unwrap_err();
    assert!(matches!(err, PmSyncError::Validation(ref v) if v.path == "[1].id"));

    let empty = vec![remote_record("", "A")];
    assert!(matches!(
        c.import_collection(empty).await,
        Err(PmSyncError::Validation(_))
    ));
    assert!(c.list().is_empty());
}

#[tokio::test]
async fn import_upgrades_legacy_records() {
    let store = TestStore::new();
    let c = coordinator(&store);
    let legacy = Record::from_json(json!({
        "id": "p-old",
        "name": "Old",
        "createdAt": "2023-01-01T00:00:00.000Z",
        "updatedAt": "2023-01-01T00:00:00.000Z",
        "development": { "startDate": "2023-02-01", "targetReleaseDate": "2023-03-01" }
    }))
    .unwrap();

    c.bulk_replace(vec![legacy]).await.unwrap();

    let record = c.get("p-old").unwrap();
    assert_ne!(record.updated_at, "2023-01-01T00:00:00.000Z");
    let release = record
        .attr("development")
        .and_then(|d| d.get("releases"))
        .and_then(AttrValue::as_array)
        .and_then(|r| r.first())
        .cloned()
        .unwrap();
    assert_eq!(release.get("id").and_then(AttrValue::as_str), Some("p-old-rel-1"));
    assert_eq!(release.get("startDate").and_then(AttrValue::as_str), Some("2023-02-01"));
    assert_eq!(release.get("endDate").and_then(AttrValue::as_str), Some("2023-03-01"));
}

#[tokio::test]
async fn remote_import_replaces_remote_collection() {
    let store = TestStore::new();
    let c = coordinator(&store);
    c.set_identity(Some(user())).await.unwrap();
    c.create(named("Old")).await.unwrap();

    let count = c
        .import_collection(vec![remote_record("p-x", "X"), remote_record("p-y", "Y")])
        .await
        .unwrap();

    assert_eq!(count, 2);
    assert_eq!(store.remote_ids(), vec!["p-x".to_string(), "p-y".to_string()]);
    assert_eq!(names(&c.list()), vec!["X", "Y"]);
    assert_eq!(c.state().pending_write_count, 0);
}

#[tokio::test]
async fn partial_bulk_replace_is_reported() {
    let store = TestStore::new();
    let c = coordinator(&store);
    c.set_identity(Some(user())).await.unwrap();
    c.create(named("One")).await.unwrap();
    c.create(named("Two")).await.unwrap();
    let before = c.list();

    // Commit #1 is the delete phase, #2 the write phase.
    store.fail_commit(2, RemoteError::new("connection reset"));
    let err = c
        .import_collection(vec![remote_record("p-x", "X")])
        .await
        .unwrap_err();

    match err {
        PmSyncError::Sync(SyncError::PartialBulkReplace {
            deleted, source, ..
        }) => {
            assert_eq!(deleted, 2);
            assert_eq!(source.message, "connection reset");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // Remote is left half-written; the local store is unchanged.
    assert!(store.remote_ids().is_empty());
    assert_eq!(c.list(), before);
    assert_eq!(c.state().pending_write_count, 0);
}
