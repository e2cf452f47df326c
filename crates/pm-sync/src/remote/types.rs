//! Remote document-store types: backend trait, error, batches and snapshot
//! payloads.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::reactive::Subscription;

// ============================================================================
// Documents
// ============================================================================

/// A document body as stored remotely. Plain JSON: the wire format cannot
/// carry `undefined`, so every record is sanitized before it gets here.
pub type Document = Map<String, Value>;

/// A document together with its id, as delivered by reads and snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub id: String,
    pub data: Document,
}

/// Callback for collection snapshots: the full current collection.
pub type SnapshotListener = dyn Fn(Vec<DocumentSnapshot>) + Send + Sync;

/// Callback for single-document snapshots; `None` when the document does not
/// exist.
pub type DocumentListener = dyn Fn(Option<Document>) + Send + Sync;

// ============================================================================
// WriteBatch
// ============================================================================

/// One write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Set {
        collection: String,
        id: String,
        data: Document,
    },
    Delete {
        collection: String,
        id: String,
    },
}

/// A group of writes committed atomically by [`DocumentStore::commit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, collection: &str, id: &str, data: Document) -> &mut Self {
        self.ops.push(WriteOp::Set {
            collection: collection.to_string(),
            id: id.to_string(),
            data,
        });
        self
    }

    pub fn delete(&mut self, collection: &str, id: &str) -> &mut Self {
        self.ops.push(WriteOp::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        });
        self
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

// ============================================================================
// DocumentStore (user-provided remote backend)
// ============================================================================

/// A real-time document collection (Firestore-like).
///
/// Implementations handle network communication and authentication. Writes
/// are expected to be echoed to active listeners, including writes made by
/// this client. `listen`/`listen_document` must deliver the current state
/// once right after registration and again after every change.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read every document in `collection`.
    async fn get_all(&self, collection: &str) -> Result<Vec<DocumentSnapshot>, RemoteError>;

    /// Read one document; `None` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, RemoteError>;

    /// Create or overwrite one document.
    async fn set(&self, collection: &str, id: &str, data: Document) -> Result<(), RemoteError>;

    /// Delete one document. Deleting a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError>;

    /// Apply every write in `batch`, or none of them.
    async fn commit(&self, batch: WriteBatch) -> Result<(), RemoteError>;

    /// Subscribe to snapshots of a whole collection.
    fn listen(
        &self,
        collection: &str,
        listener: Arc<SnapshotListener>,
    ) -> Result<Subscription, RemoteError>;

    /// Subscribe to snapshots of a single document.
    fn listen_document(
        &self,
        collection: &str,
        id: &str,
        listener: Arc<DocumentListener>,
    ) -> Result<Subscription, RemoteError>;
}

// ============================================================================
// RemoteError
// ============================================================================

/// Classification of remote failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// Network or temporary server failure
    Transient,
    /// Rejected payload or unsupported operation
    Permanent,
    /// Missing or insufficient permissions
    Auth,
    /// Rate limit or quota exceeded
    Capacity,
}

/// Backend-level error, passed through to callers verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteError {
    pub message: String,
    pub kind: RemoteErrorKind,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: RemoteErrorKind::Transient,
        }
    }

    pub fn with_kind(message: impl Into<String>, kind: RemoteErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RemoteError {}
