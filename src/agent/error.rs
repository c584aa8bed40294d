//! Agent error types

use thiserror::Error;

/// Error types for pipeline submission
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Failed to serialize pipeline: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("Failed to write pipeline file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),
}
