//! Merge candidate configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_EXAMPLE_LIMIT, DEFAULT_QUERY_TIMEOUT_MS, MAX_DIFFERENCE_LEVEL};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MergeConfig {
    /// Highest difference level the candidate finder tries (1..=3). Default: 3.
    pub max_difference_level: Option<usize>,
    /// Examples returned per pattern for review. Default: 50.
    pub example_limit: Option<usize>,
    /// Timeout for loading a length's patterns. Default: 30000.
    pub timeout_ms: Option<u64>,
}

impl MergeConfig {
    /// Returns the effective max difference level, defaulting to 3.
    pub fn effective_max_difference_level(&self) -> usize {
        self.max_difference_level.unwrap_or(MAX_DIFFERENCE_LEVEL)
    }

    pub fn effective_example_limit(&self) -> usize {
        self.example_limit.unwrap_or(DEFAULT_EXAMPLE_LIMIT)
    }

    pub fn effective_timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(DEFAULT_QUERY_TIMEOUT_MS)
    }
}
