//! Merge errors.

use super::error_code::{self, ErrorCode};
use super::StorageError;

/// Errors that abort a merge batch. Any of these leaves the corpus unchanged.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("target pattern {pattern_id} owns no ngrams")]
    TargetHasNoNgrams { pattern_id: i64 },

    #[error("pattern {pattern_id} does not exist")]
    PatternNotFound { pattern_id: i64 },

    /// The id was consumed by another committed merge. Recompute the
    /// candidate group and retry.
    #[error("pattern {pattern_id} was already merged into {merged_into}; recompute the group and retry")]
    StaleReference { pattern_id: i64, merged_into: i64 },

    #[error("pattern {pattern_id} appears in more than one merge operation")]
    OverlappingOperations { pattern_id: i64 },

    #[error("target pattern {pattern_id} is also listed as a source")]
    TargetInSources { pattern_id: i64 },

    #[error("merge operation into {target} has no sources")]
    EmptySources { target: i64 },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl MergeError {
    /// The pattern id the failure is about, if any.
    pub fn pattern_id(&self) -> Option<i64> {
        match self {
            Self::TargetHasNoNgrams { pattern_id }
            | Self::PatternNotFound { pattern_id }
            | Self::StaleReference { pattern_id, .. }
            | Self::OverlappingOperations { pattern_id }
            | Self::TargetInSources { pattern_id } => Some(*pattern_id),
            Self::EmptySources { target } => Some(*target),
            Self::Storage(_) => None,
        }
    }
}

impl ErrorCode for MergeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::TargetHasNoNgrams { .. } | Self::PatternNotFound { .. } => {
                error_code::MERGE_PRECONDITION
            }
            Self::StaleReference { .. } => error_code::STALE_REFERENCE,
            Self::OverlappingOperations { .. }
            | Self::TargetInSources { .. }
            | Self::EmptySources { .. } => error_code::INVALID_MERGE_PLAN,
            Self::Storage(e) => e.error_code(),
        }
    }
}
