//! Cache Entry Module
//!
//! Defines the type-erased value stored under each cache key.

use std::any::Any;
use std::fmt;

// == Cache Entry ==
/// A single cached value of any type, recovered by checked downcast.
pub struct CacheEntry {
    /// The stored value
    value: Box<dyn Any + Send + Sync>,
    /// Concrete type of the stored value, for diagnostics
    type_name: &'static str,
    /// Insertion sequence number in the eviction order
    seq: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Boxes `value` into a new entry inserted as `seq`.
    pub fn new<V>(value: V, seq: u64) -> Self
    where
        V: Any + Send + Sync,
    {
        Self {
            value: Box::new(value),
            type_name: std::any::type_name::<V>(),
            seq,
        }
    }

    // == Replace ==
    /// Swaps in a new value, keeping the insertion sequence.
    pub fn replace<V>(&mut self, value: V)
    where
        V: Any + Send + Sync,
    {
        self.value = Box::new(value);
        self.type_name = std::any::type_name::<V>();
    }

    // == Downcast ==
    /// Returns the value as a `V`, or `None` if it was stored as another type.
    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        (*self.value).downcast_ref::<V>()
    }

    /// Mutable variant of [`CacheEntry::downcast_ref`].
    pub fn downcast_mut<V: Any>(&mut self) -> Option<&mut V> {
        (*self.value).downcast_mut::<V>()
    }

    /// Returns true if the value was stored as a `V`.
    pub fn is<V: Any>(&self) -> bool {
        (*self.value).is::<V>()
    }

    /// The untyped value.
    pub fn value(&self) -> &(dyn Any + Send + Sync) {
        &*self.value
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Insertion sequence number in the eviction order.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("type_name", &self.type_name)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_downcast_matching_type() {
        let entry = CacheEntry::new("test_value".to_string(), 0);

        assert_eq!(
            entry.downcast_ref::<String>().map(String::as_str),
            Some("test_value")
        );
        assert!(entry.is::<String>());
    }

    #[test]
    fn test_entry_downcast_wrong_type() {
        let entry = CacheEntry::new(42_i32, 0);

        assert!(entry.downcast_ref::<i64>().is_none());
        assert!(entry.downcast_ref::<String>().is_none());
        // Still holds the original
        assert_eq!(entry.downcast_ref::<i32>(), Some(&42));
    }

    #[test]
    fn test_entry_downcast_mut() {
        let mut entry = CacheEntry::new(vec![1, 2, 3], 0);

        if let Some(items) = entry.downcast_mut::<Vec<i32>>() {
            items.push(4);
        }

        assert_eq!(entry.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2, 3, 4]));
    }

    #[test]
    fn test_entry_untyped_value() {
        let entry = CacheEntry::new(1.5_f64, 0);

        assert_eq!(entry.value().downcast_ref::<f64>(), Some(&1.5));
        assert_eq!(entry.type_name(), "f64");
    }

    #[test]
    fn test_entry_debug_shows_type() {
        let entry = CacheEntry::new(7_u8, 3);
        assert_eq!(
            format!("{:?}", entry),
            "CacheEntry { type_name: \"u8\", seq: 3, .. }"
        );
    }

    #[test]
    fn test_entry_replace_keeps_seq() {
        let mut entry = CacheEntry::new(1_u8, 5);

        entry.replace("now text".to_string());

        assert_eq!(entry.seq(), 5);
        assert!(entry.downcast_ref::<u8>().is_none());
        assert_eq!(entry.type_name(), "alloc::string::String");
        assert!(entry.is::<String>());
    }
}
