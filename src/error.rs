//! Stable error classification shared by every error type in the crate.
//!
//! Log lines attach `code = err.error_code()` so failures can be grepped
//! without parsing human-readable messages.

/// Machine-readable code and retry hint for an error.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
