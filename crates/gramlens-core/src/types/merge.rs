//! Merge candidate groups and merge batch operations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::Feature;

/// One signature slot: a dimension at a token position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotRef {
    pub feature: Feature,
    pub position: usize,
}

/// Patterns identical except at `difference_level` masked slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeCandidateGroup {
    pub pattern_ids: Vec<i64>,
    pub difference_level: usize,
    pub difference_types: BTreeSet<Feature>,
    /// Masked slots whose values actually differ inside the group.
    pub differences: Vec<SlotRef>,
    pub total_frequency: f64,
}

/// Fold `sources` into `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOperation {
    pub sources: Vec<i64>,
    pub target: i64,
}

/// Summary of a committed merge batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeOutcome {
    pub batch_id: String,
    pub operations: usize,
    pub patterns_deleted: usize,
    pub ngrams_reassigned: usize,
    pub targets: Vec<i64>,
}
