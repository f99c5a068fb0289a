//! Error types for the FinAid domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all FinAid operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Source errors ---
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    // --- Record errors ---
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// A context source could not produce a fragment.
///
/// These never reach the caller of a retrieval: the engine logs them and
/// drops the source from the result.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("Source unavailable: {source_name}: {reason}")]
    Unavailable { source_name: String, reason: String },

    #[error("Source timed out: {source_name} after {timeout_ms}ms")]
    Timeout { source_name: String, timeout_ms: u64 },

    #[error("Source panicked: {0}")]
    Panicked(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Data file not found at {0}")]
    DataFileMissing(String),

    #[error("Failed to load records from {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    #[error("Failed to write records to {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Lookup failed: {0}")]
    LookupFailed(String),

    #[error("Invalid claim: {0}")]
    InvalidClaim(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),
}

impl From<RecordError> for ToolError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::InvalidClaim(reason) => ToolError::InvalidArguments(reason),
            other => ToolError::ExecutionFailed {
                tool_name: "records".into(),
                reason: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::ExecutionFailed {
            tool_name: "serialization".into(),
            reason: err.to_string(),
        }
    }
}
