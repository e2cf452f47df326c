//! MemoryDocumentStore: an in-process [`DocumentStore`].
//!
//! Behaves like a real-time store from the client's point of view: every
//! write is echoed synchronously to matching listeners (before the write
//! call returns), and a new listener immediately receives the current state.
//! Used for local development, demos and tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::reactive::Subscription;

use super::types::{
    Document, DocumentListener, DocumentSnapshot, DocumentStore, RemoteError, SnapshotListener,
    WriteBatch, WriteOp,
};

/// collection path → (document id → body)
type Collections = HashMap<String, BTreeMap<String, Document>>;

#[derive(Clone)]
enum ListenerCallback {
    Collection(Arc<SnapshotListener>),
    Document(String, Arc<DocumentListener>),
}

struct ListenerEntry {
    id: u64,
    collection: String,
    callback: ListenerCallback,
}

/// A pending delivery, built under the lock and run after it is released.
enum Delivery {
    Collection(Arc<SnapshotListener>, Vec<DocumentSnapshot>),
    Document(Arc<DocumentListener>, Option<Document>),
}

impl Delivery {
    fn run(self) {
        match self {
            Delivery::Collection(cb, docs) => cb(docs),
            Delivery::Document(cb, doc) => cb(doc),
        }
    }
}

#[derive(Default)]
struct Inner {
    collections: Mutex<Collections>,
    listeners: Mutex<Vec<ListenerEntry>>,
    next_listener_id: AtomicU64,
}

/// In-memory document store. Cloning yields another handle to the same data.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<Inner>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current documents of a collection, ordered by id.
    pub fn documents(&self, collection: &str) -> Vec<DocumentSnapshot> {
        snapshot_of(&self.inner.collections.lock(), collection)
    }

    pub fn document(&self, collection: &str, id: &str) -> Option<Document> {
        self.inner
            .collections
            .lock()
            .get(collection)
            .and_then(|docs| docs.get(id).cloned())
    }

    /// Number of live listeners across all collections.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    fn register(&self, collection: &str, callback: ListenerCallback) -> Subscription {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);

        // Initial delivery: current state, outside the locks.
        let initial = {
            let collections = self.inner.collections.lock();
            delivery_for(&collections, collection, &callback)
        };
        self.inner.listeners.lock().push(ListenerEntry {
            id,
            collection: collection.to_string(),
            callback,
        });
        initial.run();

        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.listeners.lock().retain(|l| l.id != id);
            }
        })
    }

    /// Deliver fresh snapshots to listeners affected by writes to `touched`
    /// (collection → ids).
    fn notify(&self, touched: &HashMap<String, BTreeSet<String>>) {
        let deliveries: Vec<Delivery> = {
            let listeners = self.inner.listeners.lock();
            let collections = self.inner.collections.lock();
            listeners
                .iter()
                .filter(|l| match (&l.callback, touched.get(&l.collection)) {
                    (_, None) => false,
                    (ListenerCallback::Collection(_), Some(_)) => true,
                    (ListenerCallback::Document(doc_id, _), Some(ids)) => ids.contains(doc_id),
                })
                .map(|l| delivery_for(&collections, &l.collection, &l.callback))
                .collect()
        };
        for delivery in deliveries {
            delivery.run();
        }
    }

    fn apply(&self, ops: Vec<WriteOp>) {
        let mut touched: HashMap<String, BTreeSet<String>> = HashMap::new();
        {
            let mut collections = self.inner.collections.lock();
            for op in ops {
                match op {
                    WriteOp::Set {
                        collection,
                        id,
                        data,
                    } => {
                        collections
                            .entry(collection.clone())
                            .or_default()
                            .insert(id.clone(), data);
                        touched.entry(collection).or_default().insert(id);
                    }
                    WriteOp::Delete { collection, id } => {
                        if let Some(docs) = collections.get_mut(&collection) {
                            docs.remove(&id);
                        }
                        touched.entry(collection).or_default().insert(id);
                    }
                }
            }
        }
        self.notify(&touched);
    }
}

fn snapshot_of(collections: &Collections, collection: &str) -> Vec<DocumentSnapshot> {
    collections
        .get(collection)
        .map(|docs| {
            docs.iter()
                .map(|(id, data)| DocumentSnapshot {
                    id: id.clone(),
                    data: data.clone(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn delivery_for(
    collections: &Collections,
    collection: &str,
    callback: &ListenerCallback,
) -> Delivery {
    match callback {
        ListenerCallback::Collection(cb) => {
            Delivery::Collection(Arc::clone(cb), snapshot_of(collections, collection))
        }
        ListenerCallback::Document(id, cb) => Delivery::Document(
            Arc::clone(cb),
            collections
                .get(collection)
                .and_then(|docs| docs.get(id).cloned()),
        ),
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_all(&self, collection: &str) -> Result<Vec<DocumentSnapshot>, RemoteError> {
        Ok(self.documents(collection))
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, RemoteError> {
        Ok(self.document(collection, id))
    }

    async fn set(&self, collection: &str, id: &str, data: Document) -> Result<(), RemoteError> {
        self.apply(vec![WriteOp::Set {
            collection: collection.to_string(),
            id: id.to_string(),
            data,
        }]);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError> {
        self.apply(vec![WriteOp::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        }]);
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), RemoteError> {
        if !batch.is_empty() {
            self.apply(batch.into_ops());
        }
        Ok(())
    }

    fn listen(
        &self,
        collection: &str,
        listener: Arc<SnapshotListener>,
    ) -> Result<Subscription, RemoteError> {
        Ok(self.register(collection, ListenerCallback::Collection(listener)))
    }

    fn listen_document(
        &self,
        collection: &str,
        id: &str,
        listener: Arc<DocumentListener>,
    ) -> Result<Subscription, RemoteError> {
        Ok(self.register(
            collection,
            ListenerCallback::Document(id.to_string(), listener),
        ))
    }
}
