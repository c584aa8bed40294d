//! buildpipe - dynamically generate Buildkite pipelines for monorepos

pub mod agent;
pub mod changes;
pub mod cli;
pub mod core;
pub mod execution;
pub mod expansion;

// Re-export commonly used types
pub use agent::{AgentError, BuildkiteAgentUploader, PipelineUploader, UploadConfig};
pub use changes::{ChangedFilesProvider, GitChangedFiles, GitConfig, StaticChangedFiles};
pub use crate::core::{Pipeline, Project, ProjectRegistry, Step, StepEntry};
pub use execution::{RunOutcome, Runner};
pub use expansion::{expand, plan, Plan};
