//! RecordStore: the authoritative in-memory record collection plus the
//! OrderIndex. Synchronous, no I/O; persistence and notification belong to
//! the caller.

use crate::error::StoreError;
use crate::types::Record;

use super::order::apply_order;

/// In-memory records in insertion order, and the user's display order.
///
/// Writes are full replacements: `upsert` never merges nested groups, so a
/// field dropped by the caller cannot linger from an older copy.
#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    records: Vec<Record>,
    order: Vec<String>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `records` and an empty OrderIndex.
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records,
            order: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Copy of every record, in insertion order.
    pub fn list(&self) -> Vec<Record> {
        self.records.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records arranged by the OrderIndex (see [`apply_order`]).
    pub fn ordered(&self) -> Vec<Record> {
        apply_order(&self.records, &self.order)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Replace the record with the same id, or append it. Returns the
    /// previous value if one was replaced.
    pub fn upsert(&mut self, record: Record) -> Option<Record> {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => Some(std::mem::replace(slot, record)),
            None => {
                self.records.push(record);
                None
            }
        }
    }

    /// Remove and return the record, or `None` if it is not present.
    pub fn take(&mut self, id: &str) -> Option<Record> {
        let index = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(index))
    }

    /// Remove the record, failing with `NotFound` when it is not present.
    pub fn remove(&mut self, id: &str) -> Result<Record, StoreError> {
        self.take(id).ok_or_else(|| StoreError::not_found(id))
    }

    /// Replace the whole collection. The OrderIndex is kept.
    pub fn replace_all(&mut self, records: Vec<Record>) {
        self.records = records;
    }

    /// Drop every record and the OrderIndex.
    pub fn clear(&mut self) {
        self.records.clear();
        self.order.clear();
    }

    // -----------------------------------------------------------------------
    // OrderIndex
    // -----------------------------------------------------------------------

    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Replace the OrderIndex wholesale. Membership is not validated: unknown
    /// ids are dropped and missing ones appended at render time.
    pub fn apply_order(&mut self, new_order: Vec<String>) {
        self.order = new_order;
    }

    /// Append a freshly created id, unless the index already lists it.
    pub fn push_order(&mut self, id: &str) {
        if !self.order.iter().any(|o| o == id) {
            self.order.push(id.to_string());
        }
    }

    /// Drop a deleted id from the index.
    pub fn forget_order(&mut self, id: &str) {
        self.order.retain(|o| o != id);
    }
}
