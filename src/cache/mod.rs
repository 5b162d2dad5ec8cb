//! Cache Module
//!
//! Provides an in-memory cache with type-erased keys and FIFO count-limit eviction.

mod entry;
mod key;
mod order;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use key::{AnyKey, DynKey, FloatKey};
pub(crate) use order::InsertionOrder;
pub use stats::CacheStats;
pub use store::{MemoryCache, SharedCache};
