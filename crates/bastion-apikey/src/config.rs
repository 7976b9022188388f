//! API key service configuration.

use std::time::Duration;

/// Configuration for [`ApiKeyService`](crate::ApiKeyService).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Maximum number of cached digest lookups. `0` disables the cache.
    pub cache_capacity: usize,
    /// Minimum time between two persisted last-used refreshes of a key.
    pub last_used_refresh: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 1024,
            last_used_refresh: Duration::from_secs(60),
        }
    }
}

impl ServiceConfig {
    /// Larger cache for busy installations.
    pub fn production() -> Self {
        Self {
            cache_capacity: 10_000,
            ..Self::default()
        }
    }

    /// No caching; every lookup reads through.
    pub fn disabled() -> Self {
        Self {
            cache_capacity: 0,
            ..Self::default()
        }
    }
}
