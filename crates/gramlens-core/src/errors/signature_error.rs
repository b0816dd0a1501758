//! Signature algebra errors.

use super::error_code::{self, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("split position {position} is outside a signature of length {length}")]
    SplitOutOfRange { position: usize, length: usize },

    #[error("signature '{signature}' has {found} parts, expected {expected}")]
    PartCount {
        signature: String,
        expected: usize,
        found: usize,
    },

    #[error("slot {slot} is outside a signature of length {length}")]
    SlotOutOfRange { slot: usize, length: usize },
}

impl ErrorCode for SignatureError {
    fn error_code(&self) -> &'static str {
        error_code::SIGNATURE_ERROR
    }
}
