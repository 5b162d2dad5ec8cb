//! Cache Statistics Module
//!
//! Tracks evictions, explicit removals and low-memory flushes.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// Counters describing how entries have left the cache.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Entries dropped to honour the count limit
    pub evictions: u64,
    /// Entries dropped by `remove`, `remove_matching` or `remove_all`
    pub removals: u64,
    /// Low-memory notifications handled
    pub low_memory_flushes: u64,
    /// When the most recent low-memory flush happened
    pub last_flush_at: Option<DateTime<Utc>>,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Eviction ==
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Removals ==
    /// Adds `count` explicitly removed entries.
    pub fn record_removals(&mut self, count: usize) {
        self.removals += count as u64;
    }

    // == Record Low-Memory Flush ==
    /// Counts a flush and stamps it with the current time.
    pub fn record_low_memory_flush(&mut self) {
        self.low_memory_flushes += 1;
        self.last_flush_at = Some(Utc::now());
    }

    // == Update Entry Count ==
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.removals, 0);
        assert_eq!(stats.low_memory_flushes, 0);
        assert!(stats.last_flush_at.is_none());
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_record_eviction() {
        let mut stats = CacheStats::new();
        stats.record_eviction();
        stats.record_eviction();
        assert_eq!(stats.evictions, 2);
    }

    #[test]
    fn test_record_removals_accumulates() {
        let mut stats = CacheStats::new();
        stats.record_removals(3);
        stats.record_removals(0);
        stats.record_removals(2);
        assert_eq!(stats.removals, 5);
    }

    #[test]
    fn test_record_low_memory_flush_stamps_time() {
        let mut stats = CacheStats::new();
        let before = Utc::now();

        stats.record_low_memory_flush();

        assert_eq!(stats.low_memory_flushes, 1);
        let stamped = stats.last_flush_at.unwrap();
        assert!(stamped >= before);
    }

    #[test]
    fn test_stats_serialize() {
        let mut stats = CacheStats::new();
        stats.record_eviction();
        stats.set_total_entries(42);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["evictions"], 1);
        assert_eq!(json["total_entries"], 42);
        assert!(json["last_flush_at"].is_null());
    }
}
