pub mod error;
pub mod types;

pub mod reactive;
pub mod record;
pub mod remote;
pub mod store;
pub mod sync;

pub use error::{PmSyncError, Result};
pub use types::{AttrValue, Attributes, Identity, Record};
pub use sync::{CoordinatorOptions, Mutation, SyncCoordinator, SyncPhase, SyncState};
