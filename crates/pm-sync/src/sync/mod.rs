pub mod coordinator;
pub mod types;

pub use coordinator::SyncCoordinator;
pub use types::{CoordinatorOptions, Mutation, SyncPhase, SyncState, DEFAULT_WRITE_TIMEOUT};
