//! Legacy shape upgrade: rewrites the single-milestone `development` layout
//! into the current list of release entries.
//!
//! Older records carried one release as scalars on `development`
//! (`targetReleaseDate`, `actualReleaseDate`). The current layout keeps a
//! `development.releases` array of entries with their own dates.

use std::collections::BTreeMap;

use crate::types::{AttrValue, Record};

pub const DEVELOPMENT: &str = "development";
pub const RELEASES: &str = "releases";

const LEGACY_TARGET: &str = "targetReleaseDate";
const LEGACY_ACTUAL: &str = "actualReleaseDate";
const START_DATE: &str = "startDate";

// ============================================================================
// Public Types
// ============================================================================

/// Result of running a record through the shape upgrade.
#[derive(Debug)]
pub struct MigrationResult {
    pub record: Record,
    /// Whether anything was rewritten (false if already current).
    pub migrated: bool,
}

// ============================================================================
// Core Migration Logic
// ============================================================================

/// Check if a record still uses the legacy layout: `development` missing,
/// not an object, or without a `releases` array.
pub fn needs_migration(record: &Record) -> bool {
    match record.attr(DEVELOPMENT) {
        Some(AttrValue::Object(dev)) => !matches!(dev.get(RELEASES), Some(AttrValue::Array(_))),
        _ => true,
    }
}

/// Upgrade a record to the current shape and report whether it changed.
///
/// Legacy scalar release dates become one derived release entry; without
/// them the record gets an empty `releases` list. The legacy scalars are
/// removed. Records already in the current shape are returned untouched, so
/// running this twice is the same as running it once.
pub fn migrate(mut record: Record) -> MigrationResult {
    if !needs_migration(&record) {
        return MigrationResult {
            record,
            migrated: false,
        };
    }

    let mut dev = match record.attrs.remove(DEVELOPMENT) {
        Some(AttrValue::Object(dev)) => dev,
        _ => BTreeMap::new(),
    };

    let target = take_scalar(&mut dev, LEGACY_TARGET);
    let actual = take_scalar(&mut dev, LEGACY_ACTUAL);

    let releases = if target.is_some() || actual.is_some() {
        let start = dev
            .get(START_DATE)
            .filter(|v| !is_blank(v))
            .cloned()
            .unwrap_or(AttrValue::Null);

        let mut entry = BTreeMap::new();
        entry.insert("id".to_string(), AttrValue::String(format!("{}-rel-1", record.id)));
        entry.insert("name".to_string(), AttrValue::from("Release 1"));
        entry.insert("startDate".to_string(), start);
        entry.insert("endDate".to_string(), target.unwrap_or(AttrValue::Null));
        entry.insert("actualEndDate".to_string(), actual.unwrap_or(AttrValue::Null));
        vec![AttrValue::Object(entry)]
    } else {
        Vec::new()
    };

    dev.insert(RELEASES.to_string(), AttrValue::Array(releases));
    record
        .attrs
        .insert(DEVELOPMENT.to_string(), AttrValue::Object(dev));

    MigrationResult {
        record,
        migrated: true,
    }
}

/// Upgrade a record to the current shape. Convenience wrapper around
/// [`migrate`] that drops the report.
pub fn migrate_legacy_shape(record: Record) -> Record {
    migrate(record).record
}

/// Upgrade a batch of records, returning them with the number rewritten.
pub fn migrate_all(records: Vec<Record>) -> (Vec<Record>, usize) {
    let mut migrated = 0;
    let records = records
        .into_iter()
        .map(|record| {
            let result = migrate(record);
            if result.migrated {
                migrated += 1;
            }
            result.record
        })
        .collect();
    (records, migrated)
}

fn take_scalar(dev: &mut BTreeMap<String, AttrValue>, key: &str) -> Option<AttrValue> {
    dev.remove(key).filter(|v| !is_blank(v))
}

fn is_blank(value: &AttrValue) -> bool {
    match value {
        AttrValue::Undefined | AttrValue::Null => true,
        AttrValue::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
