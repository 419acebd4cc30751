// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Probe output is missing an expected field
    #[error("Failed to probe {path}: {message}")]
    ProbeFail { path: String, message: String },

    /// Malformed user-supplied time string
    #[error("Invalid time format '{input}': {reason}. Expected HH:MM:SS[.fraction]")]
    InvalidTimeFormat { input: String, reason: String },

    /// Range arithmetic produced an empty, negative or unordered range
    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),

    /// Two inputs that must agree on a field do not
    #[error("{field} of first file {first_path} ({first}) doesn't match {field} of second file {second_path} ({second})")]
    ProfileMismatch {
        field: String,
        first_path: String,
        first: String,
        second_path: String,
        second: String,
    },

    /// Out-of-range channel index
    #[error("Invalid channel number {channel}: {reason}")]
    InvalidChannel { channel: usize, reason: String },

    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),

    /// External process could not be started or exited non-zero
    #[error("{program} failed: {status}")]
    EngineFail { program: String, status: String },

    /// File system operation failed
    #[error("File system error: {0}")]
    FsFail(String),

    /// Engine request failed validation before serialization
    #[error("Invalid engine request: {0}")]
    InvalidRequest(String),
}

impl DomainError {
    pub(crate) fn format(input: &str, reason: impl Into<String>) -> Self {
        DomainError::InvalidTimeFormat {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
