//! Error handling for gramlens.
//! One error enum per subsystem, `thiserror` only.

pub mod analysis_error;
pub mod config_error;
pub mod error_code;
pub mod filter_error;
pub mod merge_error;
pub mod signature_error;
pub mod storage_error;

pub use analysis_error::AnalysisError;
pub use config_error::ConfigError;
pub use error_code::ErrorCode;
pub use filter_error::FilterError;
pub use merge_error::MergeError;
pub use signature_error::SignatureError;
pub use storage_error::StorageError;

/// Top-level error aggregating every subsystem via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum GramlensError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ErrorCode for GramlensError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Storage(e) => e.error_code(),
            Self::Signature(e) => e.error_code(),
            Self::Filter(e) => e.error_code(),
            Self::Merge(e) => e.error_code(),
            Self::Analysis(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
        }
    }
}

/// Convenience alias used at crate boundaries.
pub type GramlensResult<T> = Result<T, GramlensError>;
