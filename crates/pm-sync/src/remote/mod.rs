pub mod adapter;
pub mod codec;
pub mod memory;
pub mod scope;
pub mod types;

pub use adapter::{OrderCallback, RecordsCallback, RemoteSyncAdapter};
pub use codec::sanitize;
pub use memory::MemoryDocumentStore;
pub use scope::{Scope, ScopeLayout};
pub use types::{
    Document, DocumentListener, DocumentSnapshot, DocumentStore, RemoteError, RemoteErrorKind,
    SnapshotListener, WriteBatch, WriteOp,
};
