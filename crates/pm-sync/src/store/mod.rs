pub mod cache;
pub mod order;
pub mod record_store;

pub use cache::{CacheSnapshot, FileCache, LocalCache, MemoryCache};
pub use order::apply_order;
pub use record_store::RecordStore;
