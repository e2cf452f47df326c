//! Local persistence for the signed-out (Disconnected) mode.
//!
//! The cache is a plain snapshot of the store: records plus the OrderIndex.
//! It is read once by `SyncCoordinator::initialize` and rewritten after each
//! local-only mutation.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::types::Record;

/// What the local cache holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub records: Vec<Record>,
    #[serde(default)]
    pub order: Vec<String>,
}

/// Storage for [`CacheSnapshot`]s.
///
/// `load` returns `Ok(None)` when nothing has been saved yet, which is
/// different from a saved empty snapshot (the user deleted everything).
pub trait LocalCache: Send + Sync {
    fn load(&self) -> Result<Option<CacheSnapshot>, StoreError>;
    fn save(&self, snapshot: &CacheSnapshot) -> Result<(), StoreError>;
}

// ============================================================================
// FileCache
// ============================================================================

/// Pretty-printed JSON file. Writes go to a sibling temp file that is then
/// renamed over the target, so a crash mid-write leaves the old snapshot.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(
        &self,
        message: &str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> StoreError {
        StoreError::Cache {
            location: self.path.display().to_string(),
            message: message.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

impl LocalCache for FileCache {
    fn load(&self) -> Result<Option<CacheSnapshot>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.error("read failed", e)),
        };

        // Older caches stored a bare array of records.
        let value: serde_json::Value =
            serde_json::from_str(&raw).map_err(|e| self.error("invalid JSON", e))?;
        let snapshot = if value.is_array() {
            CacheSnapshot {
                records: serde_json::from_value(value)
                    .map_err(|e| self.error("invalid records", e))?,
                order: Vec::new(),
            }
        } else {
            serde_json::from_value(value).map_err(|e| self.error("invalid snapshot", e))?
        };
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &CacheSnapshot) -> Result<(), StoreError> {
        let json =
            serde_json::to_string_pretty(snapshot).map_err(|e| self.error("encode failed", e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.error("create dir failed", e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.error("write failed", e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.error("rename failed", e))?;
        Ok(())
    }
}

// ============================================================================
// MemoryCache
// ============================================================================

/// In-process cache, mostly for tests and embedding without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryCache {
    snapshot: Mutex<Option<CacheSnapshot>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache that already holds `snapshot`.
    pub fn with_snapshot(snapshot: CacheSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
        }
    }

    pub fn snapshot(&self) -> Option<CacheSnapshot> {
        self.snapshot.lock().clone()
    }
}

impl LocalCache for MemoryCache {
    fn load(&self) -> Result<Option<CacheSnapshot>, StoreError> {
        Ok(self.snapshot.lock().clone())
    }

    fn save(&self, snapshot: &CacheSnapshot) -> Result<(), StoreError> {
        *self.snapshot.lock() = Some(snapshot.clone());
        Ok(())
    }
}
