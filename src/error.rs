//! Error types for the cache
//!
//! Cache operations themselves never fail; these cover configuration and the
//! low-memory listener's runtime requirements.

use thiserror::Error;

// == Nevermore Error Enum ==
/// Unified error type for the crate.
#[derive(Error, Debug)]
pub enum NevermoreError {
    /// An environment variable was set to an unusable value
    #[error("Invalid configuration: {name}={value:?}: {reason}")]
    InvalidConfig {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// The low-memory listener was started outside a Tokio runtime
    #[error("No Tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, NevermoreError>;
