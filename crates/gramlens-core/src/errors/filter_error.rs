//! Filter model errors.

use super::error_code::{self, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("filter block {block_id} not found")]
    BlockNotFound { block_id: String },

    #[error("rule {rule_id} not found in block {block_id}")]
    RuleNotFound { block_id: String, rule_id: String },

    #[error("filter JSON could not be decoded: {message}")]
    Decode { message: String },
}

impl ErrorCode for FilterError {
    fn error_code(&self) -> &'static str {
        error_code::FILTER_ERROR
    }
}
