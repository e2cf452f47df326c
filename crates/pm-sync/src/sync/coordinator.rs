//! SyncCoordinator keeps the in-memory collection consistent with the
//! remote document store while the user mutates it optimistically.
//!
//! While an identity is set, every mutation is written remote-first and
//! applied to the [`RecordStore`] only once the remote call settles
//! successfully. Inbound snapshots from the live watches are discarded while
//! any such write is outstanding (a counter, not a flag, so overlapping
//! writes keep suppression on until the last one settles). Without an
//! identity the coordinator runs local-only against an optional cache.
//!
//! Locking: the state mutex is never held across an `.await`, nor while
//! calling the document store or change listeners. Watch callbacks may run
//! synchronously inside a remote call, so they take the lock themselves.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::{
    error::{Result, StoreError, SyncError, ValidationError},
    reactive::{EventEmitter, Subscription},
    record::{migrate::migrate_all, prepare_import, prepare_new, prepare_update},
    remote::{RemoteSyncAdapter, Scope, ScopeLayout},
    store::{CacheSnapshot, LocalCache, RecordStore},
    types::{Attributes, Identity, Record},
};

use super::types::{CoordinatorOptions, Mutation, SyncPhase, SyncState, DEFAULT_WRITE_TIMEOUT};

// ============================================================================
// State
// ============================================================================

struct CoordinatorState {
    store: RecordStore,
    identity: Option<Identity>,
    scope: Option<Scope>,
    /// Identity set but initial fetch / watch installation not finished.
    connecting: bool,
    pending_writes: usize,
    /// Bumped on every teardown. Snapshots and write continuations carry the
    /// session they started in and are dropped when it no longer matches.
    session: u64,
    watches: Vec<Subscription>,
    /// Records held locally when the identity was established, kept for
    /// `upload_local_records`.
    stash: Vec<Record>,
    /// Local OrderIndex at the time the stash was taken.
    stash_order: Vec<String>,
    initialized: bool,
}

impl CoordinatorState {
    fn new() -> Self {
        Self {
            store: RecordStore::new(),
            identity: None,
            scope: None,
            connecting: false,
            pending_writes: 0,
            session: 0,
            watches: Vec::new(),
            stash: Vec::new(),
            stash_order: Vec::new(),
            initialized: false,
        }
    }

    fn phase(&self) -> SyncPhase {
        if self.identity.is_none() {
            SyncPhase::Disconnected
        } else if self.connecting {
            SyncPhase::Connecting
        } else if self.pending_writes > 0 {
            SyncPhase::WriteInFlight
        } else {
            SyncPhase::Synced
        }
    }

    fn cache_snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            records: self.store.list(),
            order: self.store.order().to_vec(),
        }
    }

    /// Move the signed-out collection into the stash. Records stashed by an
    /// earlier, unfinished sign-in are kept unless the store holds a copy.
    fn stash_local(&mut self) {
        let mut stash = self.store.list();
        let mut order = self.store.order().to_vec();
        for record in std::mem::take(&mut self.stash) {
            if !self.store.contains(&record.id) {
                stash.push(record);
            }
        }
        for id in std::mem::take(&mut self.stash_order) {
            if !order.contains(&id) {
                order.push(id);
            }
        }
        self.stash = stash;
        self.stash_order = order;
    }

    /// Put the stash back into the store. Returns false when it was empty.
    fn restore_stash(&mut self) -> bool {
        if self.stash.is_empty() {
            return false;
        }
        self.store.replace_all(std::mem::take(&mut self.stash));
        self.store.apply_order(std::mem::take(&mut self.stash_order));
        true
    }

    fn clear_stash(&mut self) {
        self.stash.clear();
        self.stash_order.clear();
    }

    /// Drop the remote session: back to Disconnected with an empty store.
    /// Returns the watches to cancel once the lock is released.
    fn reset_session(&mut self) -> Vec<Subscription> {
        self.store.clear();
        self.identity = None;
        self.scope = None;
        self.connecting = false;
        self.pending_writes = 0;
        self.session += 1;
        std::mem::take(&mut self.watches)
    }
}

struct Inner {
    state: Mutex<CoordinatorState>,
    emitter: Arc<EventEmitter<[Record]>>,
    adapter: RemoteSyncAdapter,
    cache: Option<Arc<dyn LocalCache>>,
    layout: ScopeLayout,
    write_timeout: Duration,
}

impl Inner {
    fn notify(&self, records: &[Record]) {
        self.emitter.emit(records);
    }

    fn save_cache(&self, snapshot: &CacheSnapshot) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.save(snapshot) {
                tracing::warn!(error = %e, "failed to save local cache");
            }
        }
    }

    /// Collection snapshot from the records watch.
    fn accept_snapshot(&self, session: u64, records: Vec<Record>) {
        let ordered = {
            let mut st = self.state.lock();
            if st.session != session {
                return;
            }
            if st.pending_writes > 0 {
                tracing::debug!(
                    pending = st.pending_writes,
                    records = records.len(),
                    "discarding remote snapshot while writes are in flight"
                );
                return;
            }
            let (records, migrated) = migrate_all(records);
            if migrated > 0 {
                tracing::debug!(migrated, "upgraded legacy records from remote snapshot");
            }
            st.store.replace_all(records);
            st.store.ordered()
        };
        self.notify(&ordered);
    }

    /// Order side-document snapshot. A missing document leaves the current
    /// order in place.
    fn accept_order(&self, session: u64, order: Option<Vec<String>>) {
        let Some(order) = order else { return };
        let ordered = {
            let mut st = self.state.lock();
            if st.session != session {
                return;
            }
            if st.pending_writes > 0 {
                tracing::debug!(
                    pending = st.pending_writes,
                    "discarding remote order while writes are in flight"
                );
                return;
            }
            st.store.apply_order(order);
            st.store.ordered()
        };
        self.notify(&ordered);
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.write_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for watch in self.state.get_mut().watches.drain(..) {
            watch.unsubscribe();
        }
    }
}

/// Holds one slot of the pending-write counter for the duration of a remote
/// call. Released on drop, whatever the outcome.
struct PendingWrite {
    inner: Arc<Inner>,
    session: u64,
}

impl Drop for PendingWrite {
    fn drop(&mut self) {
        let mut st = self.inner.state.lock();
        // A teardown already reset the counter for this session.
        if st.session != self.session {
            return;
        }
        st.pending_writes = st.pending_writes.saturating_sub(1);
        if st.pending_writes == 0 {
            tracing::debug!(session = self.session, "phase: write-in-flight -> synced");
        }
    }
}

// ============================================================================
// SyncCoordinator
// ============================================================================

/// Owner of the record collection and its sync state. Cloning yields another
/// handle to the same coordinator.
#[derive(Clone)]
pub struct SyncCoordinator {
    inner: Arc<Inner>,
}

impl SyncCoordinator {
    pub fn new(options: CoordinatorOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(CoordinatorState::new()),
                emitter: Arc::new(EventEmitter::new()),
                adapter: RemoteSyncAdapter::new(options.store),
                cache: options.cache,
                layout: options.layout.unwrap_or_default(),
                write_timeout: options.write_timeout.unwrap_or(DEFAULT_WRITE_TIMEOUT),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Every record, in store order.
    pub fn list(&self) -> Vec<Record> {
        self.inner.state.lock().store.list()
    }

    pub fn get(&self, id: &str) -> Option<Record> {
        self.inner.state.lock().store.get(id).cloned()
    }

    /// Every record, arranged by the OrderIndex.
    pub fn ordered(&self) -> Vec<Record> {
        self.inner.state.lock().store.ordered()
    }

    pub fn order(&self) -> Vec<String> {
        self.inner.state.lock().store.order().to_vec()
    }

    pub fn state(&self) -> SyncState {
        let st = self.inner.state.lock();
        SyncState {
            identity: st.identity.clone(),
            remote_active: st.identity.is_some(),
            pending_write_count: st.pending_writes,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.inner.state.lock().phase()
    }

    /// Number of records held locally at sign-in that have not been uploaded.
    pub fn stashed_count(&self) -> usize {
        self.inner.state.lock().stash.len()
    }

    /// Register a change listener. It receives the full ordered collection
    /// after initialization, every mutation, identity change and accepted
    /// remote snapshot.
    pub fn subscribe(
        &self,
        listener: impl Fn(&[Record]) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.emitter.subscribe(listener)
    }

    // -----------------------------------------------------------------------
    // Initialization
    // -----------------------------------------------------------------------

    /// Load the signed-out collection: the cached snapshot if one was ever
    /// saved (even an empty one), otherwise `seed`, which is then cached.
    ///
    /// Runs once; later calls are no-ops until the next sign-out. Skipped
    /// while an identity is set.
    pub async fn initialize(&self, seed: Vec<Record>) -> Result<()> {
        {
            let mut st = self.inner.state.lock();
            if st.initialized {
                return Ok(());
            }
            st.initialized = true;
            if st.identity.is_some() {
                return Ok(());
            }
        }

        let loaded = match &self.inner.cache {
            Some(cache) => match cache.load() {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    self.inner.state.lock().initialized = false;
                    return Err(e.into());
                }
            },
            None => None,
        };
        let from_cache = loaded.is_some();
        let CacheSnapshot { records, order } = loaded.unwrap_or(CacheSnapshot {
            records: seed,
            order: Vec::new(),
        });
        let (records, migrated) = migrate_all(records);

        let (ordered, snapshot) = {
            let mut st = self.inner.state.lock();
            if st.identity.is_some() {
                return Ok(());
            }
            st.store.replace_all(records);
            st.store.apply_order(order);
            let rewrite = self.inner.cache.is_some() && (!from_cache || migrated > 0);
            (st.store.ordered(), rewrite.then(|| st.cache_snapshot()))
        };
        if let Some(snapshot) = snapshot {
            self.inner.save_cache(&snapshot);
        }

        tracing::info!(records = ordered.len(), from_cache, migrated, "local collection loaded");
        self.inner.notify(&ordered);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    /// Switch the remote session.
    ///
    /// Any current session is torn down first: watches cancelled, store
    /// cleared, subscribers notified. With `Some(identity)` the coordinator
    /// then fetches the remote collection and order, installs both watches
    /// and reaches `Synced`. Records held locally beforehand are not pushed;
    /// they stay available to [`upload_local_records`](Self::upload_local_records).
    ///
    /// With `None` the coordinator goes back to local-only and reloads the
    /// cached collection (or, without a cache snapshot, the records stashed
    /// at sign-in that were never uploaded).
    ///
    /// If the initial fetch fails the error is returned and the coordinator
    /// is `Disconnected` again with its signed-out records restored.
    pub async fn set_identity(&self, identity: Option<Identity>) -> Result<()> {
        let unchanged = self.inner.state.lock().identity == identity;
        if unchanged {
            return Ok(());
        }

        let was_remote = self.teardown();

        let Some(identity) = identity else {
            let ordered = self.resume_local();
            tracing::info!(records = ordered.len(), "remote session closed");
            self.inner.notify(&ordered);
            return Ok(());
        };
        self.inner.notify(&[]);

        let scope = self.inner.layout.scope_for(&identity);
        let session = {
            let mut st = self.inner.state.lock();
            // Another account's stash is not carried into this one.
            if was_remote {
                st.clear_stash();
            }
            st.identity = Some(identity.clone());
            st.scope = Some(scope.clone());
            st.connecting = true;
            st.session
        };
        tracing::info!(uid = %identity.uid, scope = %scope, session, "remote session starting");

        if let Err(e) = self.connect(&scope, session).await {
            tracing::warn!(scope = %scope, error = %e, "initial sync failed; staying disconnected");
            self.abort_connect(session);
            return Err(e);
        }
        Ok(())
    }

    async fn connect(&self, scope: &Scope, session: u64) -> Result<()> {
        let adapter = &self.inner.adapter;
        let records = self.bounded("fetch_all", adapter.fetch_all(scope)).await?;
        let order = self.bounded("read_order", adapter.read_order(scope)).await?;
        let (records, migrated) = migrate_all(records);
        let count = records.len();

        {
            let mut st = self.inner.state.lock();
            if st.session != session {
                return Ok(());
            }
            st.store.replace_all(records);
            if let Some(order) = order {
                st.store.apply_order(order);
            }
        }

        let weak = Arc::downgrade(&self.inner);
        let records_watch = adapter
            .watch(
                scope,
                Arc::new(move |records: Vec<Record>| {
                    if let Some(inner) = weak.upgrade() {
                        inner.accept_snapshot(session, records);
                    }
                }),
            )
            .map_err(SyncError::RemoteRead)?;

        let weak = Arc::downgrade(&self.inner);
        let order_watch = match adapter.watch_order(
            scope,
            Arc::new(move |order: Option<Vec<String>>| {
                if let Some(inner) = weak.upgrade() {
                    inner.accept_order(session, order);
                }
            }),
        ) {
            Ok(sub) => sub,
            Err(e) => {
                records_watch.unsubscribe();
                return Err(SyncError::RemoteRead(e).into());
            }
        };

        let ordered = {
            let mut st = self.inner.state.lock();
            if st.session != session {
                drop(st);
                records_watch.unsubscribe();
                order_watch.unsubscribe();
                return Ok(());
            }
            st.watches.push(records_watch);
            st.watches.push(order_watch);
            st.connecting = false;
            st.store.ordered()
        };

        tracing::info!(records = count, migrated, session, "remote session synced");
        self.inner.notify(&ordered);
        Ok(())
    }

    /// Cancel the current session. Local records present before sign-in are
    /// stashed for upload; a remote session's records are simply dropped.
    /// Returns whether a remote session was active.
    fn teardown(&self) -> bool {
        let (was_remote, watches) = {
            let mut st = self.inner.state.lock();
            let was_remote = st.identity.is_some();
            if was_remote {
                st.initialized = false;
            } else if !st.store.is_empty() {
                st.stash_local();
            }
            (was_remote, st.reset_session())
        };
        for watch in &watches {
            watch.unsubscribe();
        }
        tracing::debug!(watches = watches.len(), was_remote, "session torn down");
        was_remote
    }

    fn abort_connect(&self, session: u64) {
        let watches = {
            let mut st = self.inner.state.lock();
            if st.session != session {
                return;
            }
            st.reset_session()
        };
        for watch in &watches {
            watch.unsubscribe();
        }
        let ordered = self.resume_local();
        self.inner.notify(&ordered);
    }

    /// Refill the store for local-only use. An uninitialized coordinator
    /// reloads the cache snapshot; otherwise (or without one) the stash goes
    /// back into the store. Local writes made afterwards therefore never
    /// save a partial collection over the cache.
    fn resume_local(&self) -> Vec<Record> {
        let needs_load = !self.inner.state.lock().initialized;
        let loaded = match &self.inner.cache {
            Some(cache) if needs_load => cache.load().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to reload local cache");
                None
            }),
            _ => None,
        };

        let mut st = self.inner.state.lock();
        if st.identity.is_some() {
            return st.store.ordered();
        }
        match loaded {
            Some(CacheSnapshot { records, order }) => {
                let (records, migrated) = migrate_all(records);
                tracing::debug!(records = records.len(), migrated, "local cache reloaded");
                st.store.replace_all(records);
                st.store.apply_order(order);
                st.clear_stash();
                st.initialized = true;
            }
            None => {
                if st.restore_stash() {
                    st.initialized = true;
                }
            }
        }
        st.store.ordered()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Apply one mutation and return the record it produced (for deletes,
    /// the record removed).
    ///
    /// Validation happens first and failures change nothing. With an
    /// identity the remote write goes first and the store is updated only on
    /// success; otherwise the store and local cache are updated directly.
    pub async fn mutate(&self, mutation: Mutation) -> Result<Record> {
        tracing::trace!(kind = mutation.kind(), "mutation");
        match mutation {
            Mutation::Create(patch) => {
                let record = prepare_new(patch)?;
                self.commit_record(record, true).await
            }
            Mutation::Update { id, patch } => {
                let existing = self.get(&id).ok_or_else(|| StoreError::not_found(&id))?;
                let record = prepare_update(&existing, patch)?;
                self.commit_record(record, false).await
            }
            Mutation::Delete { id } => self.commit_delete(id).await,
        }
    }

    pub async fn create(&self, patch: Attributes) -> Result<Record> {
        self.mutate(Mutation::Create(patch)).await
    }

    pub async fn update(&self, id: &str, patch: Attributes) -> Result<Record> {
        self.mutate(Mutation::Update {
            id: id.to_string(),
            patch,
        })
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<Record> {
        self.mutate(Mutation::Delete { id: id.to_string() }).await
    }

    /// Replace the OrderIndex. Ids are not checked against the collection.
    pub async fn reorder(&self, order: Vec<String>) -> Result<()> {
        match self.begin_write() {
            Some((scope, guard)) => {
                let applied = order.clone();
                self.remote_then_apply(
                    "write_order",
                    guard,
                    self.inner.adapter.write_order(&scope, &order),
                    move |store| store.apply_order(applied),
                )
                .await
            }
            None => {
                self.apply_local(move |store| store.apply_order(order));
                Ok(())
            }
        }
    }

    /// Replace the whole collection. Every record gets a fresh `updatedAt`
    /// and is upgraded to the current shape; ids must be present and unique.
    ///
    /// Remotely this is a two-phase replace (delete all, then write all). If
    /// the second phase fails the remote collection is left partially
    /// written and [`SyncError::PartialBulkReplace`] is returned; the local
    /// store keeps its previous contents.
    pub async fn import_collection(&self, records: Vec<Record>) -> Result<usize> {
        let records = prepare_import(records)?;
        let count = records.len();
        match self.begin_write() {
            Some((scope, guard)) => {
                let applied = records.clone();
                self.remote_then_apply(
                    "replace_all",
                    guard,
                    self.inner.adapter.replace_all(&scope, &records),
                    move |store| store.replace_all(applied),
                )
                .await?;
            }
            None => self.apply_local(move |store| store.replace_all(records)),
        }
        tracing::info!(records = count, "collection replaced");
        Ok(count)
    }

    /// Alias of [`import_collection`](Self::import_collection).
    pub async fn bulk_replace(&self, records: Vec<Record>) -> Result<usize> {
        self.import_collection(records).await
    }

    /// Parse a JSON array of records (as produced by
    /// [`export_collection`](Self::export_collection)) and import it.
    pub async fn import_json(&self, json: &str) -> Result<usize> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_array() {
            return Err(ValidationError::new("$", "expected an array of records").into());
        }
        let records: Vec<Record> = serde_json::from_value(value)?;
        self.import_collection(records).await
    }

    /// The collection as a pretty-printed JSON array, in store order.
    pub fn export_collection(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.list())?)
    }

    /// Push the records that were held locally when the identity was set
    /// and that the remote does not already have. Each goes through the
    /// normal remote-first create path. Returns how many were uploaded.
    ///
    /// On failure the records not yet uploaded are kept for another attempt.
    pub async fn upload_local_records(&self) -> Result<usize> {
        let pending: Vec<Record> = {
            let mut st = self.inner.state.lock();
            if st.scope.is_none() || st.connecting {
                return Err(SyncError::NotConnected.into());
            }
            let stash = std::mem::take(&mut st.stash);
            stash
                .into_iter()
                .filter(|r| !st.store.contains(&r.id))
                .collect()
        };

        let mut uploaded = 0;
        let mut remaining = pending.into_iter();
        while let Some(record) = remaining.next() {
            let connected = self.inner.state.lock().scope.is_some();
            let result = if connected {
                self.commit_record(record.clone(), true).await
            } else {
                Err(SyncError::NotConnected.into())
            };
            if let Err(e) = result {
                let mut st = self.inner.state.lock();
                if st.scope.is_some() {
                    st.stash.push(record);
                    st.stash.extend(remaining);
                }
                return Err(e);
            }
            uploaded += 1;
        }

        tracing::info!(uploaded, "local records uploaded");
        Ok(uploaded)
    }

    // -----------------------------------------------------------------------
    // Write plumbing
    // -----------------------------------------------------------------------

    async fn commit_record(&self, record: Record, is_new: bool) -> Result<Record> {
        match self.begin_write() {
            Some((scope, guard)) => {
                let applied = record.clone();
                self.remote_then_apply(
                    "put",
                    guard,
                    self.inner.adapter.put(&scope, &record),
                    move |store| {
                        if is_new {
                            store.push_order(&applied.id);
                        }
                        store.upsert(applied);
                    },
                )
                .await?;
            }
            None => {
                let applied = record.clone();
                self.apply_local(move |store| {
                    if is_new {
                        store.push_order(&applied.id);
                    }
                    store.upsert(applied);
                });
            }
        }
        Ok(record)
    }

    async fn commit_delete(&self, id: String) -> Result<Record> {
        let existing = self.get(&id).ok_or_else(|| StoreError::not_found(&id))?;
        let forget = |store: &mut RecordStore| {
            store.take(&id);
            store.forget_order(&id);
        };
        match self.begin_write() {
            Some((scope, guard)) => {
                self.remote_then_apply(
                    "delete",
                    guard,
                    self.inner.adapter.delete(&scope, &id),
                    forget,
                )
                .await?;
            }
            None => self.apply_local(forget),
        }
        Ok(existing)
    }

    /// Take a pending-write slot if a remote session is active.
    fn begin_write(&self) -> Option<(Scope, PendingWrite)> {
        let mut st = self.inner.state.lock();
        let scope = st.scope.clone()?;
        st.pending_writes += 1;
        if st.pending_writes == 1 {
            tracing::debug!(session = st.session, "phase: synced -> write-in-flight");
        }
        let guard = PendingWrite {
            inner: Arc::clone(&self.inner),
            session: st.session,
        };
        Some((scope, guard))
    }

    /// Await the remote call, then apply to the store and notify. The store
    /// is left untouched when the call fails or the session changed in the
    /// meantime. `guard` is released only after the store is updated.
    async fn remote_then_apply(
        &self,
        operation: &'static str,
        guard: PendingWrite,
        call: impl Future<Output = Result<(), SyncError>>,
        apply: impl FnOnce(&mut RecordStore),
    ) -> Result<()> {
        self.bounded(operation, call)
            .await
            .inspect_err(|e| tracing::warn!(operation, error = %e, "remote write failed"))?;

        let ordered = {
            let mut st = self.inner.state.lock();
            if st.session != guard.session {
                tracing::debug!(operation, "session changed during remote write; not applied");
                return Ok(());
            }
            apply(&mut st.store);
            st.store.ordered()
        };
        drop(guard);
        self.inner.notify(&ordered);
        Ok(())
    }

    /// Signed-out write: store, cache, notify.
    fn apply_local(&self, apply: impl FnOnce(&mut RecordStore)) {
        let (ordered, snapshot) = {
            let mut st = self.inner.state.lock();
            apply(&mut st.store);
            let snapshot = self.inner.cache.is_some().then(|| st.cache_snapshot());
            (st.store.ordered(), snapshot)
        };
        if let Some(snapshot) = snapshot {
            self.inner.save_cache(&snapshot);
        }
        self.inner.notify(&ordered);
    }

    /// Run a remote call under the configured timeout.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, SyncError>>,
    ) -> Result<T, SyncError> {
        match tokio::time::timeout(self.inner.write_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = self.inner.timeout_ms();
                tracing::warn!(operation, timeout_ms, "remote call timed out");
                Err(SyncError::Timeout {
                    operation,
                    timeout_ms,
                })
            }
        }
    }
}

impl std::fmt::Debug for SyncCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.inner.state.lock();
        f.debug_struct("SyncCoordinator")
            .field("phase", &st.phase())
            .field("records", &st.store.len())
            .field("pending_writes", &st.pending_writes)
            .field("session", &st.session)
            .finish()
    }
}
