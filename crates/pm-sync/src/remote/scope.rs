//! Remote path layout for one identity's data.

use crate::types::Identity;

/// Path templates for the remote collections. `{uid}` is replaced by the
/// identity's user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeLayout {
    /// Collection holding one document per record.
    pub records: String,
    /// Collection holding the order side-document.
    pub settings: String,
    /// Id of the order side-document inside `settings`.
    pub order_doc: String,
    /// Field of the side-document that stores the id list.
    pub order_field: String,
}

impl Default for ScopeLayout {
    fn default() -> Self {
        Self {
            records: "users/{uid}/projects".to_string(),
            settings: "users/{uid}/settings".to_string(),
            order_doc: "projectOrder".to_string(),
            order_field: "order".to_string(),
        }
    }
}

impl ScopeLayout {
    pub fn scope_for(&self, identity: &Identity) -> Scope {
        Scope {
            records: self.records.replace("{uid}", &identity.uid),
            settings: self.settings.replace("{uid}", &identity.uid),
            order_doc: self.order_doc.clone(),
            order_field: self.order_field.clone(),
        }
    }
}

/// Resolved remote paths for one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub records: String,
    pub settings: String,
    pub order_doc: String,
    pub order_field: String,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.records)
    }
}
