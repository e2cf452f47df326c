//! Record preparation. Pure functions, no I/O.
//!
//! Resolves create/update patches into complete records before they reach
//! the store or the remote: validation, defaults, trimming, timestamps.
//! The store only ever sees full replacements.

use std::collections::{BTreeMap, HashSet};

use crate::{
    error::{Result, ValidationError},
    types::{AttrValue, Attributes, Record},
};

use super::{
    autofill::{generate_record_id, now_rfc3339},
    migrate::migrate_legacy_shape,
};

/// Text attributes that are trimmed on write and default to `""` on create.
pub const TRIMMED_FIELDS: [&str; 3] = ["client", "onHoldReason", "notes"];

/// Keys a patch can never overwrite.
const PROTECTED_KEYS: [&str; 3] = ["id", "createdAt", "updatedAt"];

const NAME_REQUIRED: &str = "Project name is required";

// ============================================================================
// Validation
// ============================================================================

/// Validate and trim a primary name.
pub fn validate_name(value: Option<&AttrValue>) -> Result<String, ValidationError> {
    match value {
        Some(AttrValue::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(ValidationError::new("name", NAME_REQUIRED)),
    }
}

// ============================================================================
// Create
// ============================================================================

/// Build a brand-new record from a create patch.
///
/// Generates the id and timestamps, applies the project defaults
/// (`status`, `priority`, empty `discovery`/`development` groups) and
/// returns it in the current shape.
pub fn prepare_new(patch: Attributes) -> Result<Record> {
    let name = validate_name(patch.get("name"))?;
    let now = now_rfc3339();

    let mut attrs: Attributes = patch
        .into_iter()
        .filter(|(k, _)| k != "name" && !PROTECTED_KEYS.contains(&k.as_str()))
        .collect();

    for field in TRIMMED_FIELDS {
        let trimmed = trimmed_or_empty(attrs.get(field));
        attrs.insert(field.to_string(), AttrValue::String(trimmed));
    }
    default_string(&mut attrs, "status", "discovery");
    default_string(&mut attrs, "priority", "medium");
    default_object(&mut attrs, "discovery");
    default_object(&mut attrs, "development");

    let record = Record {
        id: generate_record_id(),
        name,
        created_at: now.clone(),
        updated_at: now,
        attrs,
    };
    Ok(migrate_legacy_shape(record))
}

// ============================================================================
// Update
// ============================================================================

/// Apply an update patch over `existing`.
///
/// Top-level keys in the patch replace the existing ones wholesale (no deep
/// merge). `id` and `createdAt` never change. A `name` present in the patch
/// must be non-blank; an absent (or undefined) name keeps the current one.
pub fn prepare_update(existing: &Record, patch: Attributes) -> Result<Record> {
    let mut record = existing.clone();

    match patch.get("name") {
        None | Some(AttrValue::Undefined) => {}
        present => record.name = validate_name(present)?,
    }

    for (key, value) in patch {
        if key == "name" || PROTECTED_KEYS.contains(&key.as_str()) {
            continue;
        }
        let value = if TRIMMED_FIELDS.contains(&key.as_str()) {
            AttrValue::String(trimmed_or_empty(Some(&value)))
        } else {
            value
        };
        record.attrs.insert(key, value);
    }

    record.updated_at = now_rfc3339();
    Ok(record)
}

// ============================================================================
// Import
// ============================================================================

/// Prepare an imported collection: every record needs a unique, non-empty
/// id; `updatedAt` is refreshed and legacy shapes are upgraded.
pub fn prepare_import(records: Vec<Record>) -> Result<Vec<Record>> {
    let now = now_rfc3339();
    let mut seen = HashSet::with_capacity(records.len());

    records
        .into_iter()
        .enumerate()
        .map(|(index, mut record)| -> Result<Record> {
            if record.id.trim().is_empty() {
                return Err(
                    ValidationError::new(format!("[{index}].id"), "Record id is required").into(),
                );
            }
            if !seen.insert(record.id.clone()) {
                return Err(ValidationError::new(
                    format!("[{index}].id"),
                    format!("Duplicate record id \"{}\"", record.id),
                )
                .into());
            }
            record.updated_at = now.clone();
            Ok(migrate_legacy_shape(record))
        })
        .collect()
}

// ============================================================================
// Helpers
// ============================================================================

fn trimmed_or_empty(value: Option<&AttrValue>) -> String {
    value
        .and_then(AttrValue::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn default_string(attrs: &mut Attributes, key: &str, default: &str) {
    let missing = match attrs.get(key) {
        None => true,
        Some(AttrValue::String(s)) => s.is_empty(),
        Some(v) => v.is_nullish(),
    };
    if missing {
        attrs.insert(key.to_string(), AttrValue::from(default));
    }
}

fn default_object(attrs: &mut Attributes, key: &str) {
    if attrs.get(key).map_or(true, AttrValue::is_nullish) {
        attrs.insert(key.to_string(), AttrValue::Object(BTreeMap::new()));
    }
}
