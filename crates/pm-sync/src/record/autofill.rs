//! Generated ids and timestamps for new and updated records.

use chrono::{SecondsFormat, Utc};

/// Prefix shared by every generated project id.
pub const RECORD_ID_PREFIX: &str = "p";

/// Length of the random suffix, in hex digits (48 bits).
const SUFFIX_LEN: usize = 12;

/// Generate a record id: `p-<unix millis>-<random hex>`.
///
/// The suffix comes from a v4 UUID, so two clients creating records in the
/// same millisecond still collide with negligible probability.
pub fn generate_record_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{RECORD_ID_PREFIX}-{millis}-{}", &random[..SUFFIX_LEN])
}

/// Current time as an RFC 3339 string with millisecond precision.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
