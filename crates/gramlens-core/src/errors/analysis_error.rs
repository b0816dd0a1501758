//! Errors from facet, candidate and construction analysis.

use super::error_code::{self, ErrorCode};
use super::{FilterError, MergeError, SignatureError, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis cancelled")]
    Cancelled,

    #[error("analysis timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("pattern {pattern_id} not found")]
    PatternNotFound { pattern_id: i64 },

    #[error("every candidate subset failed for phrase length {phrase_length}")]
    AllSubsetsFailed { phrase_length: usize },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

impl ErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => error_code::CANCELLED,
            Self::Timeout { .. } => error_code::TIMEOUT,
            Self::PatternNotFound { .. } | Self::AllSubsetsFailed { .. } => {
                error_code::ANALYSIS_ERROR
            }
            Self::Storage(e) => e.error_code(),
            Self::Merge(e) => e.error_code(),
            Self::Signature(e) => e.error_code(),
            Self::Filter(e) => e.error_code(),
        }
    }
}
