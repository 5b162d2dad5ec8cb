//! Configuration Module
//!
//! Handles loading cache and demo settings from environment variables.

use std::env;
use std::str::FromStr;

use crate::error::{NevermoreError, Result};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of cached entries, 0 = unlimited
    pub count_limit: usize,
    /// Buffered low-memory notifications per listener
    pub notifier_capacity: usize,
    /// Demo binary: milliseconds between cache writes
    pub demo_interval_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `NEVERMORE_COUNT_LIMIT` - Maximum cache entries (default: 0, unlimited)
    /// - `NEVERMORE_NOTIFIER_CAPACITY` - Notification buffer, must be > 0 (default: 16)
    /// - `NEVERMORE_DEMO_INTERVAL_MS` - Demo write interval, must be > 0 (default: 250)
    ///
    /// Unset variables take their default; set but unparsable ones are an error.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            count_limit: read_var("NEVERMORE_COUNT_LIMIT", defaults.count_limit)?,
            notifier_capacity: read_var(
                "NEVERMORE_NOTIFIER_CAPACITY",
                defaults.notifier_capacity,
            )?,
            demo_interval_ms: read_var("NEVERMORE_DEMO_INTERVAL_MS", defaults.demo_interval_ms)?,
        };

        if config.notifier_capacity == 0 {
            return Err(NevermoreError::InvalidConfig {
                name: "NEVERMORE_NOTIFIER_CAPACITY",
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if config.demo_interval_ms == 0 {
            return Err(NevermoreError::InvalidConfig {
                name: "NEVERMORE_DEMO_INTERVAL_MS",
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            count_limit: 0,
            notifier_capacity: 16,
            demo_interval_ms: 250,
        }
    }
}

/// Parses `name` from the environment, falling back to `default` when unset.
fn read_var<T>(name: &'static str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|err: T::Err| NevermoreError::InvalidConfig {
                name,
                value: raw.clone(),
                reason: err.to_string(),
            }),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err @ env::VarError::NotUnicode(_)) => Err(NevermoreError::InvalidConfig {
            name,
            value: String::new(),
            reason: err.to_string(),
        }),
    }
}
