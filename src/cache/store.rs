//! Cache Store Module
//!
//! Main cache engine: a HashMap keyed by type-erased keys, with FIFO eviction
//! once an optional item-count limit is exceeded.

use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::key::{erase, AnyKey, DynKey, FloatKey};
use crate::cache::{CacheEntry, CacheStats, InsertionOrder};
use crate::config::Config;

/// A cache shared between tasks.
///
/// `MemoryCache` itself is not synchronized; this is the handle to pass
/// around when more than one task needs it.
pub type SharedCache = Arc<RwLock<MemoryCache>>;

// == Memory Cache ==
/// In-memory cache with heterogeneous keys and values.
///
/// Any `Hash + Eq + Send + Sync + 'static` value can be a key, and keys of
/// different types never collide: `1_i32` and `1_i64` are separate entries.
/// Values are stored untyped and recovered with a checked downcast.
///
/// With a nonzero count limit, inserting past the limit evicts the oldest
/// inserted entries first. Overwriting a key keeps its original position and
/// reads never reorder, so this is FIFO rather than LRU.
#[derive(Debug, Default)]
pub struct MemoryCache {
    /// Key-value storage
    entries: HashMap<AnyKey, CacheEntry>,
    /// Eviction order
    order: InsertionOrder,
    /// Removal counters
    stats: CacheStats,
    /// Maximum number of entries, 0 = unlimited
    count_limit: usize,
}

impl MemoryCache {
    // == Constructors ==
    /// Creates an empty cache with no count limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache holding at most `count_limit` entries (0 = unlimited).
    pub fn with_count_limit(count_limit: usize) -> Self {
        Self {
            count_limit,
            ..Self::default()
        }
    }

    /// Creates an empty cache from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::with_count_limit(config.count_limit)
    }

    /// Wraps the cache for sharing between tasks.
    pub fn shared(self) -> SharedCache {
        Arc::new(RwLock::new(self))
    }

    // == Count ==
    /// Returns the current number of entries.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Count Limit ==
    /// Returns the current count limit, 0 = unlimited.
    pub fn count_limit(&self) -> usize {
        self.count_limit
    }

    /// Sets the count limit (0 = unlimited), evicting immediately if the
    /// cache now holds too many entries.
    pub fn set_count_limit(&mut self, count_limit: usize) {
        if count_limit != self.count_limit {
            debug!(
                old_limit = self.count_limit,
                new_limit = count_limit,
                "Cache count limit changed"
            );
            self.count_limit = count_limit;
        }
        self.evict_items_if_needed();
    }

    // == Set ==
    /// Stores `item` under `key`, replacing any existing entry.
    ///
    /// A new key goes to the back of the eviction order; an overwritten key
    /// keeps its place.
    pub fn set<K, V>(&mut self, key: K, item: V)
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Any + Send + Sync,
    {
        match self.entries.entry(AnyKey::new(key)) {
            Entry::Occupied(mut occupied) => occupied.get_mut().replace(item),
            Entry::Vacant(vacant) => {
                let seq = self.order.push(vacant.key().clone());
                vacant.insert(CacheEntry::new(item, seq));
            }
        }
        self.evict_items_if_needed();
    }

    // == Get ==
    /// Returns the entry for `key` as a `V`.
    ///
    /// `None` if there is no entry, or if the entry was stored as a type other
    /// than `V`. A mismatched entry is left in place.
    pub fn get<V, K>(&self, key: &K) -> Option<&V>
    where
        V: Any,
        K: DynKey,
    {
        self.entries.get(erase(key))?.downcast_ref::<V>()
    }

    /// Mutable variant of [`MemoryCache::get`].
    pub fn get_mut<V, K>(&mut self, key: &K) -> Option<&mut V>
    where
        V: Any,
        K: DynKey,
    {
        self.entries.get_mut(erase(key))?.downcast_mut::<V>()
    }

    /// Returns true if an entry exists for `key`, whatever its value type.
    pub fn contains<K: DynKey>(&self, key: &K) -> bool {
        self.entries.contains_key(erase(key))
    }

    // == Remove ==
    /// Removes the entry for `key`. Returns false if there was none.
    pub fn remove<K: DynKey>(&mut self, key: &K) -> bool {
        let Some(entry) = self.entries.remove(erase(key)) else {
            return false;
        };
        self.order.remove(entry.seq());
        self.stats.record_removals(1);
        true
    }

    // == Remove Matching ==
    /// Removes every entry whose key is a `K` accepted by `predicate`.
    ///
    /// Keys of other types are skipped. Returns the number removed.
    pub fn remove_matching<K, F>(&mut self, mut predicate: F) -> usize
    where
        K: DynKey,
        F: FnMut(&K) -> bool,
    {
        // Collect first, the map must not change under the scan
        let matched: Vec<(u64, AnyKey)> = self
            .order
            .iter()
            .filter(|(_, key)| matches!(key.downcast_ref::<K>(), Some(k) if predicate(k)))
            .map(|(seq, key)| (seq, key.clone()))
            .collect();

        if matched.is_empty() {
            return 0;
        }

        for (seq, key) in &matched {
            self.entries.remove(key);
            self.order.remove(*seq);
        }

        self.stats.record_removals(matched.len());
        matched.len()
    }

    // == Remove All ==
    /// Removes every entry.
    pub fn remove_all(&mut self) {
        let removed = self.clear();
        self.stats.record_removals(removed);
    }

    // == Low Memory ==
    /// Handles a low-memory notification by dropping every entry.
    pub fn on_low_memory(&mut self) {
        let flushed = self.clear();
        self.stats.record_low_memory_flush();
        info!(flushed, "Low-memory notification received, cache flushed");
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Integer Keys ==
    /// Returns the untyped value stored under an integer key.
    ///
    /// Integer keys are `i64`; an entry set with an `i32` key is not found here.
    pub fn int(&self, key: i64) -> Option<&(dyn Any + Send + Sync)> {
        self.untyped(&key)
    }

    /// Stores `item` under an integer key.
    pub fn set_int<V: Any + Send + Sync>(&mut self, key: i64, item: V) {
        self.set(key, item);
    }

    /// Removes the entry for an integer key. Returns false if there was none.
    pub fn remove_int(&mut self, key: i64) -> bool {
        self.remove(&key)
    }

    // == Float Keys ==
    /// Returns the untyped value stored under a floating-point key.
    pub fn float(&self, key: f64) -> Option<&(dyn Any + Send + Sync)> {
        self.untyped(&FloatKey::new(key))
    }

    /// Stores `item` under a floating-point key.
    pub fn set_float<V: Any + Send + Sync>(&mut self, key: f64, item: V) {
        self.set(FloatKey::new(key), item);
    }

    /// Removes the entry for a floating-point key. Returns false if there was none.
    pub fn remove_float(&mut self, key: f64) -> bool {
        self.remove(&FloatKey::new(key))
    }

    // == Text Keys ==
    /// Returns the untyped value stored under a text key.
    ///
    /// Text keys are stored as `String`, so they do not match entries set
    /// directly with a `&'static str` key.
    pub fn text(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.untyped(&key.to_owned())
    }

    /// Stores `item` under a text key.
    pub fn set_text<V: Any + Send + Sync>(&mut self, key: &str, item: V) {
        self.set(key.to_owned(), item);
    }

    /// Removes the entry for a text key. Returns false if there was none.
    pub fn remove_text(&mut self, key: &str) -> bool {
        self.remove(&key.to_owned())
    }

    fn untyped<K: DynKey>(&self, key: &K) -> Option<&(dyn Any + Send + Sync)> {
        self.entries.get(erase(key)).map(CacheEntry::value)
    }

    /// Drops every entry and returns how many there were.
    fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.order.clear();
        removed
    }

    // == Eviction ==
    /// Evicts oldest entries until the count limit is met.
    fn evict_items_if_needed(&mut self) {
        if self.count_limit == 0 || self.entries.len() <= self.count_limit {
            return;
        }

        let mut evicted = 0usize;
        while self.entries.len() > self.count_limit {
            let Some(key) = self.order.pop_oldest() else {
                break;
            };
            self.entries.remove(&key);
            self.stats.record_eviction();
            evicted += 1;
            debug!(key_type = key.type_name(), "Evicted cache entry");
        }

        debug!(
            evicted,
            count_limit = self.count_limit,
            "Cache count limit enforced"
        );
    }
}
