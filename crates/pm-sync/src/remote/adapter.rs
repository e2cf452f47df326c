//! RemoteSyncAdapter: record-level operations over a [`DocumentStore`].
//!
//! Translates store intents into document reads, writes and subscriptions,
//! sanitizing everything on the way out and decoding on the way in. Holds no
//! state of its own besides the backend handle; it never retries.

use std::sync::Arc;

use crate::{
    error::SyncError,
    reactive::Subscription,
    types::Record,
};

use super::{
    codec::{decode_order, decode_snapshot, encode_order, encode_record},
    scope::Scope,
    types::{Document, DocumentSnapshot, DocumentStore, RemoteError, WriteBatch},
};

/// Callback for decoded collection snapshots.
pub type RecordsCallback = dyn Fn(Vec<Record>) + Send + Sync;

/// Callback for order side-document snapshots (`None`: no order saved).
pub type OrderCallback = dyn Fn(Option<Vec<String>>) + Send + Sync;

#[derive(Clone)]
pub struct RemoteSyncAdapter {
    store: Arc<dyn DocumentStore>,
}

impl RemoteSyncAdapter {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    // -----------------------------------------------------------------------
    // Records
    // -----------------------------------------------------------------------

    /// One-shot read of the whole collection. Undecodable documents are
    /// skipped.
    pub async fn fetch_all(&self, scope: &Scope) -> Result<Vec<Record>, SyncError> {
        let docs = self
            .store
            .get_all(&scope.records)
            .await
            .map_err(SyncError::RemoteRead)?;
        Ok(decode_snapshot(&scope.records, docs))
    }

    /// Upsert one record, sanitized.
    pub async fn put(&self, scope: &Scope, record: &Record) -> Result<(), SyncError> {
        self.store
            .set(&scope.records, &record.id, encode_record(record))
            .await
            .map_err(SyncError::RemoteWrite)
    }

    pub async fn delete(&self, scope: &Scope, id: &str) -> Result<(), SyncError> {
        self.store
            .delete(&scope.records, id)
            .await
            .map_err(SyncError::RemoteWrite)
    }

    /// Replace the whole collection in two atomic phases: one batch deleting
    /// every existing document, then one batch writing `records`.
    ///
    /// The phases are not atomic with each other. A failure in the write
    /// phase, after the delete phase committed, is reported as
    /// [`SyncError::PartialBulkReplace`]; nothing is rolled back.
    pub async fn replace_all(&self, scope: &Scope, records: &[Record]) -> Result<(), SyncError> {
        let existing = self
            .store
            .get_all(&scope.records)
            .await
            .map_err(SyncError::RemoteRead)?;

        let mut deletes = WriteBatch::new();
        for doc in &existing {
            deletes.delete(&scope.records, &doc.id);
        }
        let deleted = deletes.len();
        self.store
            .commit(deletes)
            .await
            .map_err(SyncError::RemoteWrite)?;

        let mut writes = WriteBatch::new();
        for record in records {
            writes.set(&scope.records, &record.id, encode_record(record));
        }
        self.store
            .commit(writes)
            .await
            .map_err(|source| SyncError::PartialBulkReplace {
                scope: scope.records.clone(),
                deleted,
                source,
            })
    }

    /// Live subscription to the collection. `on_change` gets the full decoded
    /// snapshot now and after every remote change, this client's own writes
    /// included.
    pub fn watch(
        &self,
        scope: &Scope,
        on_change: Arc<RecordsCallback>,
    ) -> Result<Subscription, RemoteError> {
        let collection = scope.records.clone();
        self.store.listen(
            &scope.records,
            Arc::new(move |docs: Vec<DocumentSnapshot>| {
                on_change(decode_snapshot(&collection, docs));
            }),
        )
    }

    // -----------------------------------------------------------------------
    // Order side-document
    // -----------------------------------------------------------------------

    pub async fn read_order(&self, scope: &Scope) -> Result<Option<Vec<String>>, SyncError> {
        let doc = self
            .store
            .get(&scope.settings, &scope.order_doc)
            .await
            .map_err(SyncError::RemoteRead)?;
        Ok(doc.and_then(|d| decode_order(&d, &scope.order_field)))
    }

    pub async fn write_order(&self, scope: &Scope, order: &[String]) -> Result<(), SyncError> {
        self.store
            .set(
                &scope.settings,
                &scope.order_doc,
                encode_order(order, &scope.order_field),
            )
            .await
            .map_err(SyncError::RemoteWrite)
    }

    pub fn watch_order(
        &self,
        scope: &Scope,
        on_change: Arc<OrderCallback>,
    ) -> Result<Subscription, RemoteError> {
        let field = scope.order_field.clone();
        self.store.listen_document(
            &scope.settings,
            &scope.order_doc,
            Arc::new(move |doc: Option<Document>| {
                on_change(doc.and_then(|d| decode_order(&d, &field)));
            }),
        )
    }
}
