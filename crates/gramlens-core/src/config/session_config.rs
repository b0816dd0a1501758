//! Analysis session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SESSION_CACHE_CAPACITY, DEFAULT_SESSION_CACHE_TTL_SECS};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionConfig {
    /// Facet results cached per session. Default: 512.
    pub cache_capacity: Option<u64>,
    /// Seconds a cached facet result stays valid. Default: 3600.
    pub cache_ttl_secs: Option<u64>,
}

impl SessionConfig {
    pub fn effective_cache_capacity(&self) -> u64 {
        self.cache_capacity.unwrap_or(DEFAULT_SESSION_CACHE_CAPACITY)
    }

    pub fn effective_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs.unwrap_or(DEFAULT_SESSION_CACHE_TTL_SECS))
    }
}
