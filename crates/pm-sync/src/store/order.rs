//! Render-time application of the OrderIndex.

use std::collections::{HashMap, HashSet};

use crate::types::Record;

/// Arrange `records` by `order`.
///
/// The OrderIndex is only a hint over the records that exist:
/// - ids listed in `order` come first, in that order;
/// - ids in `order` with no backing record are skipped;
/// - an id listed more than once renders at its first position only;
/// - records missing from `order` are appended in store order.
///
/// Never adds or removes a record: the output is a permutation of `records`.
pub fn apply_order(records: &[Record], order: &[String]) -> Vec<Record> {
    let by_id: HashMap<&str, &Record> = records.iter().map(|r| (r.id.as_str(), r)).collect();
    let mut placed: HashSet<&str> = HashSet::with_capacity(records.len());
    let mut result = Vec::with_capacity(records.len());

    for id in order {
        if let Some(record) = by_id.get(id.as_str()) {
            if placed.insert(record.id.as_str()) {
                result.push((*record).clone());
            }
        }
    }

    for record in records {
        if placed.insert(record.id.as_str()) {
            result.push(record.clone());
        }
    }

    result
}
