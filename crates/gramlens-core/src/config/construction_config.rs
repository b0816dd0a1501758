//! Relation/construction lookup configuration.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CONSTRUCTION_TOP_K;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConstructionConfig {
    /// Results returned per side of a construction lookup. Default: 50.
    pub top_k: Option<usize>,
}

impl ConstructionConfig {
    pub fn effective_top_k(&self) -> usize {
        self.top_k.unwrap_or(DEFAULT_CONSTRUCTION_TOP_K)
    }
}
