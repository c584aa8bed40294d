//! Plugin settings, read once at startup from flags or the plugin environment

use crate::agent::UploadConfig;
use crate::changes::GitConfig;
use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::Level;

/// Prefix of the Buildkite plugin configuration variables
pub const PLUGIN_PREFIX: &str = "BUILDKITE_PLUGIN_BUILDPIPE_";

/// Settings shared by all commands
#[derive(Debug, Args, Clone)]
pub struct Settings {
    /// Path to the dynamic pipeline template
    #[arg(long, global = true, env = "BUILDKITE_PLUGIN_BUILDPIPE_DYNAMIC_PIPELINE")]
    pub dynamic_pipeline: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        long,
        global = true,
        env = "BUILDKITE_PLUGIN_BUILDPIPE_LOG_LEVEL",
        default_value = "info"
    )]
    pub log_level: String,

    /// Branch that is diffed against its previous commit
    #[arg(
        long,
        global = true,
        env = "BUILDKITE_PLUGIN_BUILDPIPE_DEFAULT_BRANCH",
        default_value = "master"
    )]
    pub default_branch: String,

    /// git command listing changed files on the default branch
    #[arg(long, global = true, env = "BUILDKITE_PLUGIN_BUILDPIPE_DIFF_DEFAULT")]
    pub diff_default: Option<String>,

    /// git command listing changed files on other branches
    #[arg(long, global = true, env = "BUILDKITE_PLUGIN_BUILDPIPE_DIFF_PR")]
    pub diff_pr: Option<String>,

    /// Branch under build
    #[arg(long, global = true, env = "BUILDKITE_BRANCH")]
    pub branch: Option<String>,

    /// Commit under build
    #[arg(long, global = true, env = "BUILDKITE_COMMIT")]
    pub commit: Option<String>,

    /// Path to the buildkite-agent executable
    #[arg(long, global = true, env = "BUILDKITE_PLUGIN_BUILDPIPE_AGENT_PATH")]
    pub agent_path: Option<String>,

    /// Timeout for git and agent commands, in seconds
    #[arg(
        long,
        global = true,
        env = "BUILDKITE_PLUGIN_BUILDPIPE_TIMEOUT",
        default_value_t = 300
    )]
    pub timeout_secs: u64,
}

impl Settings {
    /// Template path: the explicit one, else the configured one
    pub fn template_path(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.dynamic_pipeline.clone())
            .with_context(|| {
                format!(
                    "No pipeline template given (use --dynamic-pipeline or {}DYNAMIC_PIPELINE)",
                    PLUGIN_PREFIX
                )
            })
    }

    pub fn git_config(&self) -> GitConfig {
        GitConfig {
            branch: self.branch.clone(),
            commit: self.commit.clone(),
            default_branch: self.default_branch.clone(),
            diff_default: self.diff_default.clone(),
            diff_pr: self.diff_pr.clone(),
            timeout_secs: self.timeout_secs,
            ..GitConfig::default()
        }
    }

    pub fn agent_config(&self) -> UploadConfig {
        let config = UploadConfig::default().with_timeout(self.timeout_secs);
        match &self.agent_path {
            Some(path) => config.with_agent_path(path.clone()),
            None => config,
        }
    }

    /// Parsed log level, INFO when unknown
    pub fn level(&self) -> Level {
        parse_log_level(&self.log_level)
    }
}

/// Parse a log level name, accepting logrus-style aliases
pub fn parse_log_level(name: &str) -> Level {
    match name.trim().to_ascii_lowercase().as_str() {
        "warning" => Level::WARN,
        "fatal" | "panic" => Level::ERROR,
        other => Level::from_str(other).unwrap_or(Level::INFO),
    }
}
