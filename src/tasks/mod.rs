//! Background Tasks Module
//!
//! Contains tasks that react to signals from the host environment.
//!
//! # Tasks
//! - Low-memory listener: flushes a shared cache when the host reports memory pressure

mod low_memory;

pub use low_memory::{LowMemoryNotifier, LowMemorySubscription};
