//! Insertion Order Module
//!
//! Tracks the order keys were first inserted, for FIFO eviction.

use std::collections::BTreeMap;

use crate::cache::key::AnyKey;

// == Insertion Order ==
/// Tracks insertion order for FIFO eviction.
///
/// Every newly inserted key gets the next sequence number; the lowest
/// number is the oldest insertion. Removal by sequence number is O(log n).
///
/// Overwriting a key does not move it; reads never reorder.
#[derive(Debug, Default)]
pub struct InsertionOrder {
    /// Keys by insertion sequence
    order: BTreeMap<u64, AnyKey>,
    /// Sequence number for the next insertion
    next_seq: u64,
}

impl InsertionOrder {
    // == Push ==
    /// Records a newly inserted key as the newest and returns its sequence number.
    ///
    /// Callers must only push keys that are not already tracked.
    pub fn push(&mut self, key: AnyKey) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, key);
        seq
    }

    // == Remove ==
    /// Stops tracking the key inserted as `seq`. No-op if it isn't tracked.
    pub fn remove(&mut self, seq: u64) -> Option<AnyKey> {
        self.order.remove(&seq)
    }

    // == Pop Oldest ==
    /// Returns and stops tracking the oldest key.
    pub fn pop_oldest(&mut self) -> Option<AnyKey> {
        self.order.pop_first().map(|(_, key)| key)
    }

    /// Iterates `(seq, key)` pairs from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &AnyKey)> {
        self.order.iter().map(|(seq, key)| (*seq, key))
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }
}
