//! Record ⇄ document conversion.
//!
//! Encoding is where sanitization happens: every `Undefined` attribute, at
//! any depth, becomes an explicit `null`, and arrays keep their positions.
//! The remote store rejects `undefined`, so nothing reaches it unsanitized.

use serde_json::Value;

use crate::types::{AttrValue, Record};

use super::types::{Document, DocumentSnapshot};

/// Replace `Undefined` with `null` recursively and convert to JSON.
pub fn sanitize(value: &AttrValue) -> Value {
    value.to_json()
}

/// Encode a record as a remote document. Typed fields win over attributes
/// with the same key.
pub fn encode_record(record: &Record) -> Document {
    let mut doc: Document = record
        .attrs
        .iter()
        .map(|(k, v)| (k.clone(), sanitize(v)))
        .collect();
    doc.insert("id".to_string(), Value::String(record.id.clone()));
    doc.insert("name".to_string(), Value::String(record.name.clone()));
    doc.insert("createdAt".to_string(), Value::String(record.created_at.clone()));
    doc.insert("updatedAt".to_string(), Value::String(record.updated_at.clone()));
    doc
}

/// Decode a remote document into a record. The document key is the record
/// id, whatever the body says.
pub fn decode_document(snapshot: DocumentSnapshot) -> serde_json::Result<Record> {
    let DocumentSnapshot { id, mut data } = snapshot;
    data.insert("id".to_string(), Value::String(id));
    Record::from_json(Value::Object(data))
}

/// Decode every document, skipping (and logging) the ones that do not parse.
pub fn decode_snapshot(collection: &str, docs: Vec<DocumentSnapshot>) -> Vec<Record> {
    docs.into_iter()
        .filter_map(|doc| {
            let id = doc.id.clone();
            match decode_document(doc) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(collection, id = %id, error = %e, "skipping undecodable document");
                    None
                }
            }
        })
        .collect()
}

/// Read the OrderIndex out of the order side-document. Non-string entries
/// are ignored; a missing or malformed field reads as `None`.
pub fn decode_order(doc: &Document, field: &str) -> Option<Vec<String>> {
    let items = doc.get(field)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
    )
}

/// Build the order side-document body.
pub fn encode_order(order: &[String], field: &str) -> Document {
    let mut doc = Document::new();
    doc.insert(
        field.to_string(),
        Value::Array(order.iter().cloned().map(Value::String).collect()),
    );
    doc
}
