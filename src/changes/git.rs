//! Git changed-file provider - runs git as a subprocess

use crate::changes::{parse_changed_files, ChangedFilesProvider, ChangesError};
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Diff used on feature branches
pub const DEFAULT_PR_DIFF: &str = "log --name-only --no-merges --pretty=format: origin..HEAD";

/// Configuration for the git provider
#[derive(Debug, Clone)]
pub struct GitConfig {
    /// Path to git executable
    pub git_path: String,

    /// Branch under build; asked from git when unset
    pub branch: Option<String>,

    /// Commit under build; falls back to the branch name
    pub commit: Option<String>,

    /// Branch that gets the single-commit diff
    pub default_branch: String,

    /// Diff command override for the default branch
    pub diff_default: Option<String>,

    /// Diff command override for other branches
    pub diff_pr: Option<String>,

    /// Timeout for each git invocation in seconds
    pub timeout_secs: u64,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            git_path: "git".to_string(),
            branch: None,
            commit: None,
            default_branch: "master".to_string(),
            diff_default: None,
            diff_pr: None,
            timeout_secs: 120,
        }
    }
}

impl GitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    pub fn with_diff_default(mut self, command: impl Into<String>) -> Self {
        self.diff_default = Some(command.into());
        self
    }

    pub fn with_diff_pr(mut self, command: impl Into<String>) -> Self {
        self.diff_pr = Some(command.into());
        self
    }
}

/// Reads the change set from git history
#[derive(Debug, Clone)]
pub struct GitChangedFiles {
    config: GitConfig,
}

impl GitChangedFiles {
    pub fn new(config: GitConfig) -> Self {
        Self { config }
    }

    /// Branch under build
    pub async fn current_branch(&self) -> Result<String, ChangesError> {
        if let Some(branch) = self.config.branch.as_deref().filter(|b| !b.trim().is_empty()) {
            return Ok(branch.trim().to_string());
        }
        let output = self
            .run_git(&["rev-parse".to_string(), "--abbrev-ref".to_string(), "HEAD".to_string()])
            .await?;
        Ok(output.trim().to_string())
    }

    /// Whether `branch` gets the single-commit diff
    pub fn is_default_branch(&self, branch: &str) -> bool {
        branch == self.config.default_branch
    }

    /// Arguments passed to git to list changed files on `branch`
    ///
    /// A leading `git` in an override command is dropped.
    pub fn diff_args(&self, branch: &str) -> Result<Vec<String>, ChangesError> {
        let command = if self.is_default_branch(branch) {
            self.config.diff_default.clone().unwrap_or_else(|| {
                let commit = self.config.commit.as_deref().unwrap_or(branch);
                format!("log -m -1 --name-only --pretty=format: {}", commit)
            })
        } else {
            self.config
                .diff_pr
                .clone()
                .unwrap_or_else(|| DEFAULT_PR_DIFF.to_string())
        };

        let mut args = shell_words::split(&command).map_err(|e| ChangesError::InvalidCommand {
            command: command.clone(),
            message: e.to_string(),
        })?;
        if args.first().map(String::as_str) == Some("git") {
            args.remove(0);
        }
        if args.is_empty() {
            return Err(ChangesError::InvalidCommand {
                command,
                message: "no git arguments".to_string(),
            });
        }
        Ok(args)
    }

    async fn run_git(&self, args: &[String]) -> Result<String, ChangesError> {
        debug!("Running command args: {:?}", args);

        let result = timeout(
            Duration::from_secs(self.config.timeout_secs),
            Command::new(&self.config.git_path)
                .args(args)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| ChangesError::Timeout(self.config.timeout_secs))?;

        let output = result.map_err(|e| ChangesError::Spawn {
            program: self.config.git_path.clone(),
            message: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            warn!("git exited with code {}: {}", code, stderr);
            return Err(ChangesError::Command {
                command: format!("{} {}", self.config.git_path, args.join(" ")),
                code,
                stderr,
            });
        }

        String::from_utf8(output.stdout).map_err(|e| ChangesError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ChangedFilesProvider for GitChangedFiles {
    async fn changed_files(&self) -> Result<Vec<String>, ChangesError> {
        let branch = self.current_branch().await?;
        debug!("Current branch: {}", branch);

        let args = self.diff_args(&branch)?;
        let output = self.run_git(&args).await?;

        let files = parse_changed_files(&output, self.is_default_branch(&branch));
        debug!("Changed files: {:?}", files);
        Ok(files)
    }
}
