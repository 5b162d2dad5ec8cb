//! Nevermore - A small in-memory cache for derived data
//!
//! Caches values of any type under keys of any hashable type, with optional
//! FIFO eviction past an item-count limit and a flush on low memory.
//!
//! `MemoryCache` is not internally synchronized. Share one instance between
//! tasks through [`SharedCache`], created once at startup and passed to
//! whatever needs it.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{AnyKey, CacheStats, FloatKey, MemoryCache, SharedCache};
pub use config::Config;
pub use error::{NevermoreError, Result};
pub use tasks::{LowMemoryNotifier, LowMemorySubscription};
