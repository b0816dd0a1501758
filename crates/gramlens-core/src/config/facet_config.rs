//! Facet computation configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MIN_FREQUENCY, DEFAULT_MIN_QUANTITY, DEFAULT_QUERY_TIMEOUT_MS};

/// Thresholds and limits for suggestion facets.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FacetConfig {
    /// Minimum aggregate frequency (per million) for a suggestion. Default: 0.
    pub min_frequency: Option<f64>,
    /// Minimum number of matching ngrams for a suggestion. Default: 0.
    pub min_quantity: Option<u64>,
    /// Per-query timeout in milliseconds. Default: 30000.
    pub timeout_ms: Option<u64>,
    /// Cap on the positions scanned, regardless of the selected lengths.
    pub max_positions: Option<u32>,
}

impl FacetConfig {
    pub fn effective_min_frequency(&self) -> f64 {
        self.min_frequency.unwrap_or(DEFAULT_MIN_FREQUENCY)
    }

    pub fn effective_min_quantity(&self) -> u64 {
        self.min_quantity.unwrap_or(DEFAULT_MIN_QUANTITY)
    }

    pub fn effective_timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(DEFAULT_QUERY_TIMEOUT_MS)
    }
}
