//! buildkite-agent subprocess uploader

use crate::agent::{AgentError, PipelineUploader};
use crate::core::Pipeline;
use async_trait::async_trait;
use std::io::Write;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Executable used when no agent path is configured
pub const DEFAULT_AGENT: &str = "buildkite-agent";

/// How `pipeline upload` is invoked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    /// buildkite-agent executable, looked up on PATH unless absolute
    pub agent_path: String,

    /// Seconds before the upload is abandoned
    pub timeout_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            agent_path: DEFAULT_AGENT.to_string(),
            timeout_secs: 300,
        }
    }
}

impl UploadConfig {
    pub fn with_agent_path(mut self, agent_path: impl Into<String>) -> Self {
        self.agent_path = agent_path.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Uploads pipelines with `buildkite-agent pipeline upload`
#[derive(Debug, Clone)]
pub struct BuildkiteAgentUploader {
    config: UploadConfig,
}

impl BuildkiteAgentUploader {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    /// Get the agent executable path
    pub fn agent_path(&self) -> &str {
        &self.config.agent_path
    }
}

#[async_trait]
impl PipelineUploader for BuildkiteAgentUploader {
    /// Write the pipeline to a temporary file and upload it
    ///
    /// # Errors
    /// Returns `AgentError` if:
    /// - The pipeline cannot be serialized or written
    /// - buildkite-agent cannot be spawned or exits with a non-zero status
    /// - The upload times out
    async fn upload(&self, pipeline: &Pipeline) -> Result<(), AgentError> {
        let yaml = pipeline.to_yaml()?;
        debug!("Pipeline:\n{}", yaml);

        // Removed when dropped
        let mut file = tempfile::Builder::new()
            .prefix("buildpipe-")
            .suffix(".yml")
            .tempfile()?;
        file.write_all(yaml.as_bytes())?;
        file.flush()?;

        let agent = self.agent_path();
        let timeout_secs = self.config.timeout_secs;
        let result = timeout(
            Duration::from_secs(timeout_secs),
            Command::new(agent)
                .args(["pipeline", "upload"])
                .arg(file.path())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| AgentError::Timeout(timeout_secs))?;

        let output = result.map_err(|e| {
            AgentError::Upload(format!("Failed to execute {}: {}", agent, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            warn!("{} exited with code {}: {}", agent, exit_code, stderr.trim());
            return Err(AgentError::Upload(format!(
                "{} exited with code {}: {}",
                agent,
                exit_code,
                stderr.trim()
            )));
        }

        info!("Uploaded pipeline with {} steps", pipeline.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::step::Step;

    fn pipeline() -> Pipeline {
        Pipeline::new(vec![Step {
            label: Some("test:api".to_string()),
            ..Default::default()
        }
        .into()])
    }

    #[test]
    fn test_upload_config() {
        let uploader = BuildkiteAgentUploader::new(UploadConfig::default());
        assert_eq!(uploader.agent_path(), DEFAULT_AGENT);

        let config = UploadConfig::default()
            .with_agent_path("/usr/local/bin/buildkite-agent")
            .with_timeout(60);
        assert_eq!(config.agent_path, "/usr/local/bin/buildkite-agent");
        assert_eq!(config.timeout_secs, 60);
    }

    #[tokio::test]
    async fn test_upload_invalid_path() {
        let uploader = BuildkiteAgentUploader::new(
            UploadConfig::default().with_agent_path("nonexistent-buildkite-agent"),
        );
        let result = uploader.upload(&pipeline()).await;
        assert!(matches!(result, Err(AgentError::Upload(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_upload_non_zero_exit() {
        let uploader =
            BuildkiteAgentUploader::new(UploadConfig::default().with_agent_path("false"));
        let result = uploader.upload(&pipeline()).await;
        match result {
            Err(AgentError::Upload(message)) => assert!(message.contains("exited with code 1")),
            other => panic!("Expected upload failure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_upload_success() {
        let uploader =
            BuildkiteAgentUploader::new(UploadConfig::default().with_agent_path("true"));
        assert!(uploader.upload(&pipeline()).await.is_ok());
    }
}
