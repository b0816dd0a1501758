//! Stable error codes for callers that cross a process boundary.

/// Every error enum implements this to expose a structured code string.
pub trait ErrorCode {
    /// Returns the error code string (e.g., "STORAGE_UNREACHABLE").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const STORAGE_UNREACHABLE: &str = "STORAGE_UNREACHABLE";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const INTERRUPTED: &str = "INTERRUPTED";
pub const SIGNATURE_ERROR: &str = "SIGNATURE_ERROR";
pub const FILTER_ERROR: &str = "FILTER_ERROR";
pub const MERGE_PRECONDITION: &str = "MERGE_PRECONDITION";
pub const STALE_REFERENCE: &str = "STALE_REFERENCE";
pub const INVALID_MERGE_PLAN: &str = "INVALID_MERGE_PLAN";
pub const CANCELLED: &str = "CANCELLED";
pub const TIMEOUT: &str = "TIMEOUT";
pub const ANALYSIS_ERROR: &str = "ANALYSIS_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
