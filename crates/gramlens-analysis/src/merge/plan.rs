//! A validated batch of merge operations.

use gramlens_core::errors::MergeError;
use gramlens_core::types::MergeOperation;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Merge operations checked for internal consistency: every operation has
/// sources, no target is its own source and no id appears twice in the
/// batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MergeOperation>", into = "Vec<MergeOperation>")]
pub struct MergePlan {
    operations: Vec<MergeOperation>,
}

impl MergePlan {
    pub fn new(operations: Vec<MergeOperation>) -> Result<Self, MergeError> {
        let mut seen = FxHashSet::default();
        for op in &operations {
            if op.sources.is_empty() {
                return Err(MergeError::EmptySources { target: op.target });
            }
            if op.sources.contains(&op.target) {
                return Err(MergeError::TargetInSources {
                    pattern_id: op.target,
                });
            }
            for &id in op.sources.iter().chain(std::iter::once(&op.target)) {
                if !seen.insert(id) {
                    return Err(MergeError::OverlappingOperations { pattern_id: id });
                }
            }
        }
        Ok(Self { operations })
    }

    pub fn operations(&self) -> &[MergeOperation] {
        &self.operations
    }

    /// Targets in operation order.
    pub fn targets(&self) -> Vec<i64> {
        self.operations.iter().map(|op| op.target).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl TryFrom<Vec<MergeOperation>> for MergePlan {
    type Error = MergeError;

    fn try_from(operations: Vec<MergeOperation>) -> Result<Self, Self::Error> {
        Self::new(operations)
    }
}

impl From<MergePlan> for Vec<MergeOperation> {
    fn from(plan: MergePlan) -> Self {
        plan.operations
    }
}
