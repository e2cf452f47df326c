//! Record lifecycle helpers: id/timestamp generation, create/update/import
//! preparation and the legacy shape upgrade. All pure, no I/O.

pub mod autofill;
pub mod migrate;
pub mod prepare;

pub use autofill::{generate_record_id, now_rfc3339};
pub use migrate::{migrate_legacy_shape, needs_migration};
pub use prepare::{prepare_import, prepare_new, prepare_update, validate_name};
