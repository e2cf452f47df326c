use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    remote::{DocumentStore, ScopeLayout},
    store::LocalCache,
    types::{Attributes, Identity},
};

/// Default bound on every remote call made by the coordinator.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Phase / State
// ============================================================================

/// Coarse connection phase of a [`SyncCoordinator`](super::SyncCoordinator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncPhase {
    /// No identity: local-only mode.
    Disconnected,
    /// Identity set, initial fetch or watch installation still running.
    Connecting,
    /// Watching the remote collection, no local write outstanding.
    Synced,
    /// At least one remote write has not settled; inbound snapshots are
    /// discarded.
    WriteInFlight,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Synced => "synced",
            Self::WriteInFlight => "write-in-flight",
        };
        f.write_str(s)
    }
}

/// Point-in-time view of the coordinator's sync bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState {
    pub identity: Option<Identity>,
    /// Always `identity.is_some()`.
    pub remote_active: bool,
    pub pending_write_count: usize,
}

// ============================================================================
// Mutation
// ============================================================================

/// A user-issued change to the collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// New record from a (possibly partial) attribute patch. Requires `name`.
    Create(Attributes),
    /// Shallow merge of `patch` over the record `id`.
    Update { id: String, patch: Attributes },
    Delete { id: String },
}

impl Mutation {
    /// Short operation name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

// ============================================================================
// Options
// ============================================================================

/// Options for constructing a [`SyncCoordinator`](super::SyncCoordinator).
pub struct CoordinatorOptions {
    /// Remote document store used while an identity is set.
    pub store: Arc<dyn DocumentStore>,
    /// Persistence for the signed-out mode (`None` = memory only)
    pub cache: Option<Arc<dyn LocalCache>>,
    /// Remote path templates (default: `users/{uid}/projects` and
    /// `users/{uid}/settings/projectOrder`)
    pub layout: Option<ScopeLayout>,
    /// Bound on each remote call (default: 30 s)
    pub write_timeout: Option<Duration>,
}

impl CoordinatorOptions {
    /// Options with every optional field left at its default.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            cache: None,
            layout: None,
            write_timeout: None,
        }
    }
}

impl fmt::Debug for CoordinatorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinatorOptions")
            .field("cache", &self.cache.is_some())
            .field("layout", &self.layout)
            .field("write_timeout", &self.write_timeout)
            .finish_non_exhaustive()
    }
}
