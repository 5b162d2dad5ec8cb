//! Key Wrapper Module
//!
//! Type-erased cache keys so values of many hashable types can share one map.

use std::any::{Any, TypeId};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// == Dyn Key ==
/// Object-safe view of a hashable, comparable key.
///
/// Implemented for every `Hash + Eq + Send + Sync + 'static` type, so any
/// such value can be used as a cache key without further ceremony.
pub trait DynKey: Send + Sync + 'static {
    /// Returns the key as `Any` so it can be downcast to its concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Compares against another erased key.
    ///
    /// Keys of different concrete types are never equal.
    fn dyn_eq(&self, other: &dyn DynKey) -> bool;

    /// Feeds the concrete type and the key's own hash into `state`.
    fn dyn_hash(&self, state: &mut dyn Hasher);

    /// Name of the concrete key type.
    fn type_name(&self) -> &'static str;
}

impl<K> DynKey for K
where
    K: Hash + Eq + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynKey) -> bool {
        other
            .as_any()
            .downcast_ref::<K>()
            .map_or(false, |other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<K>().hash(&mut state);
        self.hash(&mut state);
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<K>()
    }
}

impl Hash for dyn DynKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dyn_hash(state);
    }
}

impl PartialEq for dyn DynKey {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other)
    }
}

impl Eq for dyn DynKey {}

impl fmt::Debug for dyn DynKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.type_name())
    }
}

/// Views a concrete key as an erased one, for borrowed map lookups.
pub(crate) fn erase<K: DynKey>(key: &K) -> &(dyn DynKey + 'static) {
    key
}

// == Any Key ==
/// A cache key wrapping exactly one value of any hashable type.
///
/// Two `AnyKey`s are equal only when they wrap the same concrete type and
/// the wrapped values compare equal, so `1_i32` and `1_i64` are distinct keys.
/// Cloning is cheap; the wrapped value is shared.
#[derive(Clone)]
pub struct AnyKey {
    inner: Arc<dyn DynKey>,
}

impl AnyKey {
    // == Constructor ==
    /// Wraps `key`. Always succeeds.
    pub fn new<K>(key: K) -> Self
    where
        K: Hash + Eq + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(key),
        }
    }

    // == Recover ==
    /// Returns the wrapped value if it is a `K`, `None` otherwise.
    pub fn downcast_ref<K: Any>(&self) -> Option<&K> {
        self.as_dyn().as_any().downcast_ref::<K>()
    }

    /// Returns true if the wrapped value is a `K`.
    pub fn is<K: Any>(&self) -> bool {
        self.as_dyn().as_any().is::<K>()
    }

    /// Name of the wrapped key's concrete type.
    pub fn type_name(&self) -> &'static str {
        self.as_dyn().type_name()
    }

    /// The wrapped key as a trait object.
    ///
    /// Always go through here rather than calling `DynKey` methods on the
    /// `Arc`, which is itself hashable and would answer for the wrong type.
    pub fn as_dyn(&self) -> &(dyn DynKey + 'static) {
        &*self.inner
    }
}

impl Hash for AnyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_dyn().hash(state);
    }
}

impl PartialEq for AnyKey {
    fn eq(&self, other: &Self) -> bool {
        self.as_dyn().dyn_eq(other.as_dyn())
    }
}

impl Eq for AnyKey {}

impl Borrow<dyn DynKey> for AnyKey {
    fn borrow(&self) -> &(dyn DynKey + 'static) {
        self.as_dyn()
    }
}

impl fmt::Debug for AnyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnyKey").field(&self.type_name()).finish()
    }
}

// == Float Key ==
/// A hashable `f64`, for caching under floating-point keys.
///
/// Compares by bit pattern after folding `-0.0` into `0.0` and every NaN
/// into a single NaN, so it is a lawful `Eq` and `Hash`.
#[derive(Debug, Clone, Copy)]
pub struct FloatKey(f64);

impl FloatKey {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    fn canonical_bits(self) -> u64 {
        if self.0.is_nan() {
            f64::NAN.to_bits()
        } else if self.0 == 0.0 {
            0
        } else {
            self.0.to_bits()
        }
    }
}

impl From<f64> for FloatKey {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl PartialEq for FloatKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bits() == other.canonical_bits()
    }
}

impl Eq for FloatKey {}

impl Hash for FloatKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_bits().hash(state);
    }
}
