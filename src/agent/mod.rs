//! Pipeline submission to the Buildkite agent

pub mod buildkite;
pub mod error;

use crate::core::Pipeline;
use async_trait::async_trait;
pub use buildkite::{BuildkiteAgentUploader, UploadConfig};
pub use error::AgentError;

/// Trait for pipeline submission - allows for different implementations
#[async_trait]
pub trait PipelineUploader: Send + Sync {
    /// Submit the expanded pipeline for execution
    async fn upload(&self, pipeline: &Pipeline) -> Result<(), AgentError>;
}

/// Prints the pipeline instead of uploading it
#[derive(Debug, Clone, Default)]
pub struct StdoutUploader;

#[async_trait]
impl PipelineUploader for StdoutUploader {
    async fn upload(&self, pipeline: &Pipeline) -> Result<(), AgentError> {
        print!("{}", pipeline.to_yaml()?);
        Ok(())
    }
}
