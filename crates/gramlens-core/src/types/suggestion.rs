//! Facet output types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Feature;

/// A candidate refinement at one position and dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub feature: Feature,
    pub value: String,
    pub frequency: f64,
    pub quantity: u64,
}

/// Position → suggestions sorted by frequency descending.
pub type SuggestionMap = BTreeMap<u32, Vec<Suggestion>>;

/// A value offered for one rule, with its aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetValue {
    pub value: String,
    pub frequency: f64,
    pub quantity: u64,
}

/// Aggregate cut-offs applied to facet values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub min_frequency: f64,
    pub min_quantity: u64,
}

impl Thresholds {
    /// Bit-exact key usable in hash maps.
    pub fn key(&self) -> (u64, u64) {
        (self.min_frequency.to_bits(), self.min_quantity)
    }
}
