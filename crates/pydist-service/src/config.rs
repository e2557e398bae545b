//! Access service configuration.

use std::num::NonZeroUsize;

use anyhow::anyhow;
#[cfg(feature = "config")]
use clap::Args;
use pydist_cache::DEFAULT_CACHE_CAPACITY;
use serde::{Deserialize, Serialize};

/// Configuration for the [`AccessService`](crate::AccessService).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ServiceConfig {
    /// Number of opened archives kept resident at once.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "cache-capacity",
            env = "CACHE_CAPACITY",
            default_value_t = DEFAULT_CACHE_CAPACITY
        )
    )]
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl ServiceConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    /// Sets the number of archives kept resident.
    pub fn with_cache_capacity(mut self, cache_capacity: usize) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }

    /// Cache capacity clamped to at least one entry.
    pub fn capacity(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.cache_capacity).unwrap_or(NonZeroUsize::MIN)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache capacity is zero.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.cache_capacity == 0 {
            return Err(anyhow!("Cache capacity must be at least 1 entry."));
        }
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServiceConfig::default();
        assert_eq!(config.cache_capacity, 4);
        assert_eq!(config.capacity().get(), 4);
        config.validate().unwrap();
    }

    #[test]
    fn test_zero_capacity_fails_validation() {
        let config = ServiceConfig::new().with_cache_capacity(0);
        assert!(config.validate().is_err());
        assert_eq!(config.capacity(), NonZeroUsize::MIN);
    }
}
