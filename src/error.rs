//! Error types for Taskloop
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Taskloop
#[derive(Debug, Error)]
pub enum TaskLoopError {
    /// Loop state persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Setup/installation error
    #[error("Setup error: {0}")]
    Setup(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Taskloop operations
pub type Result<T> = std::result::Result<T, TaskLoopError>;
