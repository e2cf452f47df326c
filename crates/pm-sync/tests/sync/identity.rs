//! Identity boundary: connect, teardown, first sign-in upload.

use std::sync::Arc;

use pm_sync::error::{PmSyncError, SyncError};
use pm_sync::remote::codec::encode_order;
use pm_sync::remote::{DocumentStore, RemoteError};
use pm_sync::store::MemoryCache;
use pm_sync::types::Identity;
use pm_sync::SyncPhase;

use super::support::*;

#[tokio::test]
async fn first_sign_in_does_not_push_local_records() {
    let store = TestStore::new();
    let c = coordinator(&store);
    let alpha = c.create(named("Alpha")).await.unwrap();
    assert_eq!(c.list().len(), 1);

    c.set_identity(Some(user())).await.unwrap();

    assert_eq!(c.phase(), SyncPhase::Synced);
    assert!(c.state().remote_active);
    assert!(c.list().is_empty());
    assert!(store.remote_ids().is_empty());
    assert_eq!(store.write_count(), 0);
    assert_eq!(c.stashed_count(), 1);

    let uploaded = c.upload_local_records().await.unwrap();

    assert_eq!(uploaded, 1);
    assert_eq!(store.remote_ids(), vec![alpha.id.clone()]);
    assert_eq!(names(&c.list()), vec!["Alpha"]);
    assert_eq!(c.stashed_count(), 0);
    assert_eq!(c.upload_local_records().await.unwrap(), 0);
}

#[tokio::test]
async fn upload_skips_records_already_remote() {
    let store = TestStore::new();
    let c = coordinator(&store);
    let alpha = c.create(named("Alpha")).await.unwrap();
    c.create(named("Beta")).await.unwrap();
    store.external_put(&alpha).await;

    c.set_identity(Some(user())).await.unwrap();
    let uploaded = c.upload_local_records().await.unwrap();

    assert_eq!(uploaded, 1);
    assert_eq!(store.remote_ids().len(), 2);
}

#[tokio::test]
async fn failed_upload_keeps_remaining_records() {
    let store = TestStore::new();
    let c = coordinator(&store);
    c.create(named("Alpha")).await.unwrap();
    c.create(named("Beta")).await.unwrap();
    c.set_identity(Some(user())).await.unwrap();

    store.fail_writes(Some(RemoteError::new("offline")));
    let err = c.upload_local_records().await.unwrap_err();
    assert!(err.is_remote());
    assert_eq!(c.stashed_count(), 2);

    store.fail_writes(None);
    assert_eq!(c.upload_local_records().await.unwrap(), 2);
}

#[tokio::test]
async fn upload_requires_identity() {
    let store = TestStore::new();
    let c = coordinator(&store);

    let err = c.upload_local_records().await.unwrap_err();

    assert!(matches!(err, PmSyncError::Sync(SyncError::NotConnected)));
}

#[tokio::test]
async fn sign_in_loads_remote_collection_and_order() {
    let store = TestStore::new();
    store.external_put(&remote_record("p-a", "A")).await;
    store.external_put(&remote_record("p-b", "B")).await;
    store
        .memory
        .set(
            SETTINGS,
            "projectOrder",
            encode_order(&["p-b".to_string(), "p-a".to_string()], "order"),
        )
        .await
        .unwrap();
    let c = coordinator(&store);
    let rec = Recorder::attach(&c);

    c.set_identity(Some(user())).await.unwrap();

    assert_eq!(c.phase(), SyncPhase::Synced);
    assert_eq!(names(&c.ordered()), vec!["B", "A"]);
    assert_eq!(names(&rec.last().unwrap()), vec!["B", "A"]);
    assert_eq!(store.memory.listener_count(), 2);
}

#[tokio::test]
async fn remote_order_changes_are_applied() {
    let store = TestStore::new();
    store.external_put(&remote_record("p-a", "A")).await;
    store.external_put(&remote_record("p-b", "B")).await;
    let c = coordinator(&store);
    c.set_identity(Some(user())).await.unwrap();
    assert_eq!(names(&c.ordered()), vec!["A", "B"]);

    store
        .memory
        .set(
            SETTINGS,
            "projectOrder",
            encode_order(&["p-b".to_string()], "order"),
        )
        .await
        .unwrap();

    assert_eq!(c.order(), vec!["p-b".to_string()]);
    assert_eq!(names(&c.ordered()), vec!["B", "A"]);
}

#[tokio::test]
async fn sign_out_tears_down_watches() {
    let store = TestStore::new();
    let c = coordinator(&store);
    c.set_identity(Some(user())).await.unwrap();
    c.create(named("Alpha")).await.unwrap();
    let rec = Recorder::attach(&c);

    c.set_identity(None).await.unwrap();

    assert_eq!(c.phase(), SyncPhase::Disconnected);
    assert!(c.list().is_empty());
    assert_eq!(c.state().identity, None);
    assert_eq!(store.memory.listener_count(), 0);
    assert_eq!(rec.last(), Some(Vec::new()));

    // Later remote changes do not reach the store.
    store
        .external_put(&remote_record("p-late", "Late"))
        .await;
    assert!(c.list().is_empty());

    // Signing out twice is harmless.
    c.set_identity(None).await.unwrap();
    assert_eq!(c.phase(), SyncPhase::Disconnected);
}

#[tokio::test]
async fn switching_identity_replaces_the_session() {
    let store = TestStore::new();
    let other = remote_record("p-other", "Other");
    store
        .memory
        .set(
            "users/u2/projects",
            &other.id,
            pm_sync::remote::codec::encode_record(&other),
        )
        .await
        .unwrap();
    let c = coordinator(&store);
    c.set_identity(Some(user())).await.unwrap();
    c.create(named("Mine")).await.unwrap();

    c.set_identity(Some(Identity::new("u2"))).await.unwrap();

    assert_eq!(names(&c.list()), vec!["Other"]);
    assert_eq!(store.memory.listener_count(), 2);
    assert_eq!(c.stashed_count(), 0);
    assert_eq!(c.state().identity, Some(Identity::new("u2")));
}

#[tokio::test]
async fn failed_initial_fetch_stays_disconnected() {
    let store = TestStore::new();
    store.external_put(&remote_record("p-a", "A")).await;
    store.fail_reads(Some(RemoteError::new("unavailable")));
    let c = coordinator(&store);

    let err = c.set_identity(Some(user())).await.unwrap_err();

    assert!(matches!(err, PmSyncError::Sync(SyncError::RemoteRead(_))));
    assert_eq!(c.phase(), SyncPhase::Disconnected);
    assert!(c.list().is_empty());
    assert!(!c.state().remote_active);
    assert_eq!(store.memory.listener_count(), 0);

    store.fail_reads(None);
    c.set_identity(Some(user())).await.unwrap();
    assert_eq!(names(&c.list()), vec!["A"]);
}

#[tokio::test]
async fn sign_out_allows_reloading_local_cache() {
    let store = TestStore::new();
    let cache = Arc::new(MemoryCache::new());
    let c = coordinator_with_cache(&store, cache.clone());
    c.initialize(Vec::new()).await.unwrap();
    c.create(named("Offline")).await.unwrap();

    c.set_identity(Some(user())).await.unwrap();
    c.create(named("Online")).await.unwrap();
    // Remote-backed writes never touch the local cache.
    assert_eq!(cache.snapshot().unwrap().records.len(), 1);

    c.set_identity(None).await.unwrap();
    c.initialize(Vec::new()).await.unwrap();

    assert_eq!(names(&c.list()), vec!["Offline"]);
}

#[tokio::test]
async fn failed_sign_in_restores_local_records() {
    let store = TestStore::new();
    let cache = Arc::new(MemoryCache::new());
    let c = coordinator_with_cache(&store, cache.clone());
    c.initialize(Vec::new()).await.unwrap();
    let offline = c.create(named("Offline")).await.unwrap();

    store.fail_reads(Some(RemoteError::new("unavailable")));
    c.set_identity(Some(user())).await.unwrap_err();

    assert_eq!(c.phase(), SyncPhase::Disconnected);
    assert_eq!(names(&c.list()), vec!["Offline"]);
    assert_eq!(c.stashed_count(), 0);

    // A local edit now must not shrink the cache to the new record.
    let later = c.create(named("Later")).await.unwrap();
    assert_eq!(
        names(&cache.snapshot().unwrap().records),
        vec!["Offline", "Later"]
    );

    store.fail_reads(None);
    c.set_identity(Some(user())).await.unwrap();
    assert_eq!(c.stashed_count(), 2);
    assert_eq!(c.upload_local_records().await.unwrap(), 2);

    let remote = store.remote_ids();
    assert!(remote.contains(&offline.id));
    assert!(remote.contains(&later.id));
}

#[tokio::test]
async fn local_write_after_sign_out_keeps_cached_records() {
    let store = TestStore::new();
    let cache = Arc::new(MemoryCache::new());
    let c = coordinator_with_cache(&store, cache.clone());
    c.initialize(Vec::new()).await.unwrap();
    c.create(named("Offline")).await.unwrap();
    c.set_identity(Some(user())).await.unwrap();
    let rec = Recorder::attach(&c);

    c.set_identity(None).await.unwrap();

    assert_eq!(names(&c.list()), vec!["Offline"]);
    assert_eq!(names(&rec.last().unwrap()), vec!["Offline"]);

    c.create(named("AfterSignOut")).await.unwrap();
    c.initialize(Vec::new()).await.unwrap();

    assert_eq!(names(&c.list()), vec!["Offline", "AfterSignOut"]);
    assert_eq!(
        names(&cache.snapshot().unwrap().records),
        vec!["Offline", "AfterSignOut"]
    );
}

#[tokio::test]
async fn sign_out_without_cache_restores_records_never_uploaded() {
    let store = TestStore::new();
    let c = coordinator(&store);
    c.create(named("Alpha")).await.unwrap();
    c.set_identity(Some(user())).await.unwrap();
    assert!(c.list().is_empty());

    c.set_identity(None).await.unwrap();

    assert_eq!(names(&c.list()), vec!["Alpha"]);
    assert_eq!(c.stashed_count(), 0);
    assert!(store.remote_ids().is_empty());
}

#[tokio::test]
async fn phase_is_connecting_until_initial_fetch_returns() {
    let store = TestStore::new();
    store.external_put(&remote_record("p-a", "A")).await;
    store.gate_reads(true);
    let c = coordinator(&store);

    let connecting = c.clone();
    let task = tokio::spawn(async move { connecting.set_identity(Some(user())).await });
    store.read_entered.notified().await;

    assert_eq!(c.phase(), SyncPhase::Connecting);
    assert!(c.state().remote_active);
    assert!(c.list().is_empty());
    let err = c.upload_local_records().await.unwrap_err();
    assert!(matches!(err, PmSyncError::Sync(SyncError::NotConnected)));

    store.gate_reads(false);
    store.read_release.notify_one();
    task.await.unwrap().unwrap();

    assert_eq!(c.phase(), SyncPhase::Synced);
    assert_eq!(names(&c.list()), vec!["A"]);
}
