use std::fmt;
use thiserror::Error;

use crate::remote::RemoteError;

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// A rejected input: a required field is missing or blank, or an import
/// payload has the wrong shape. Raised before any state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, r#"Validation failed at "{}": {}"#, self.path, self.message)
    }
}

impl std::error::Error for ValidationError {}

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {id}")]
    NotFound { id: String },

    #[error("Local cache failure at {location}: {message}")]
    Cache {
        location: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}

// ---------------------------------------------------------------------------
// SyncError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Remote write failed: {0}")]
    RemoteWrite(#[source] RemoteError),

    #[error("Remote read failed: {0}")]
    RemoteRead(#[source] RemoteError),

    #[error(
        "Bulk replace of \"{scope}\" interrupted after deleting {deleted} documents; \
         the remote collection is partially written"
    )]
    PartialBulkReplace {
        scope: String,
        deleted: usize,
        #[source]
        source: RemoteError,
    },

    #[error("Remote {operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("Remote sync is not active. Call set_identity() first.")]
    NotConnected,
}

// ---------------------------------------------------------------------------
// PmSyncError (top-level rollup)
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PmSyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PmSyncError {
    /// True when the failure came from the remote store (write, read, bulk
    /// replace or timeout) and the same call can be retried unchanged.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Sync(e) if !matches!(e, SyncError::NotConnected))
    }
}

/// Convenience alias; the default error type is `PmSyncError`.
pub type Result<T, E = PmSyncError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
