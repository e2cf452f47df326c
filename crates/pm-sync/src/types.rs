use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

// ============================================================================
// AttrValue
// ============================================================================

/// A JSON-like attribute value.
///
/// Unlike `serde_json::Value` it can hold `Undefined`: a field that was
/// touched by a partially filled form but never given a value. `Undefined`
/// lives only in memory; it serializes as `null` and is replaced by `null`
/// before anything is sent to the remote store.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttrValue {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<AttrValue>),
    Object(BTreeMap<String, AttrValue>),
}

/// Attribute groups keyed by field name. Used both for the flattened
/// attributes of a [`Record`] and for create/update patches.
pub type Attributes = BTreeMap<String, AttrValue>;

impl AttrValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// `Undefined` or `Null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<AttrValue>> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, AttrValue>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut BTreeMap<String, AttrValue>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Member lookup on objects; `None` for anything else.
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Consume an object value into its members. Non-objects yield `None`.
    pub fn into_object(self) -> Option<Attributes> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Convert to JSON, writing `Undefined` as `null` at every depth.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Undefined | Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::Array(items) => Value::Array(items.iter().map(AttrValue::to_json).collect()),
            Self::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for AttrValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(AttrValue::from).collect()),
            Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Undefined | Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => items.serialize(serializer),
            Self::Object(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for AttrValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(AttrValue::from)
    }
}

/// Build [`Attributes`] from a JSON object literal. Non-object input yields
/// an empty map.
pub fn attrs(value: Value) -> Attributes {
    AttrValue::from(value).into_object().unwrap_or_default()
}

// ============================================================================
// Record
// ============================================================================

/// One tracked project.
///
/// `id`, `name` and the lifecycle timestamps are typed; every other attribute
/// group is kept in `attrs` and flattened into the same JSON object on the
/// wire and in exports. Records written by older versions may lack any of the
/// typed fields apart from `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// RFC 3339
    #[serde(default, deserialize_with = "null_as_empty")]
    pub created_at: String,
    /// RFC 3339
    #[serde(default, deserialize_with = "null_as_empty")]
    pub updated_at: String,
    #[serde(flatten)]
    pub attrs: Attributes,
}

impl Record {
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Decode a record from a JSON object.
    pub fn from_json(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

/// Older writers stored `null` for fields they never filled in.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Identity
// ============================================================================

/// The externally supplied identity that gates remote sync. Opaque apart from
/// the user id, which selects the remote [`Scope`](crate::remote::Scope).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}
