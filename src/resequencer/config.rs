/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 15/10/26
******************************************************************************/

//! Resequencer engine configuration.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default maximum number of buffered elements.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default eviction timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Settings for a [`ResequencerEngine`](super::ResequencerEngine).
///
/// Missing fields fall back to their defaults when deserializing.
///
/// # Examples
///
/// ```
/// use resequencer_rs::ResequencerConfig;
/// use std::time::Duration;
///
/// let config = ResequencerConfig::from_json(r#"{ "capacity": 64, "reject_old": true }"#).unwrap();
/// assert_eq!(config.capacity, 64);
/// assert_eq!(config.timeout(), Duration::from_millis(1000));
/// assert!(config.reject_old);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResequencerConfig {
    /// Maximum number of elements buffered while waiting for delivery.
    pub capacity: usize,

    /// How long an element may wait for its predecessor, in milliseconds.
    pub timeout_ms: u64,

    /// Refuse elements that sort before the last delivered element.
    pub reject_old: bool,

    /// Silently drop elements the comparator reports as invalid.
    pub ignore_invalid: bool,
}

impl Default for ResequencerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            reject_old: false,
            ignore_invalid: false,
        }
    }
}

impl ResequencerConfig {
    /// Sets the buffer capacity.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the eviction timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Enables or disables rejection of elements older than the last delivery.
    #[must_use]
    pub fn with_reject_old(mut self, reject_old: bool) -> Self {
        self.reject_old = reject_old;
        self
    }

    /// Enables or disables silently dropping invalid elements.
    #[must_use]
    pub fn with_ignore_invalid(mut self, ignore_invalid: bool) -> Self {
        self.ignore_invalid = ignore_invalid;
        self
    }

    /// Returns the eviction timeout.
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Checks that the configuration can drive an engine.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ZeroCapacity`] if `capacity` is zero
    /// - [`ConfigError::ZeroTimeout`] if `timeout_ms` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and the
    /// [`validate`](Self::validate) errors for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
