//! Changed-file detection
//!
//! The expansion engine only needs the list of files touched by the change
//! under build. Where that list comes from is behind [`ChangedFilesProvider`].

pub mod git;

use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;

pub use git::{GitChangedFiles, GitConfig};

/// Error types for changed-file detection
#[derive(Debug, Error)]
pub enum ChangesError {
    #[error("Failed to run {program}: {message}")]
    Spawn { program: String, message: String },

    #[error("{command} exited with code {code}: {stderr}")]
    Command {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Invalid diff command '{command}': {message}")]
    InvalidCommand { command: String, message: String },

    #[error("Failed to decode command output: {0}")]
    Decode(String),
}

/// Trait for changed-file sources - allows for different implementations
#[async_trait]
pub trait ChangedFilesProvider: Send + Sync {
    /// Relative paths of changed files, deduplicated, without empty entries
    async fn changed_files(&self) -> Result<Vec<String>, ChangesError>;
}

/// A fixed list of changed files
#[derive(Debug, Clone, Default)]
pub struct StaticChangedFiles {
    files: Vec<String>,
}

impl StaticChangedFiles {
    pub fn new<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl ChangedFilesProvider for StaticChangedFiles {
    async fn changed_files(&self) -> Result<Vec<String>, ChangesError> {
        Ok(dedupe(self.files.iter().map(String::as_str)))
    }
}

/// Turn `git log --name-only` output into a change set
///
/// With `first_block_only`, only lines before the first blank line are kept.
/// For a merge commit listed with `-m` that is the diff against the first
/// parent.
pub fn parse_changed_files(output: &str, first_block_only: bool) -> Vec<String> {
    let lines = output.lines().map(str::trim_end);
    if first_block_only {
        dedupe(lines.take_while(|line| !line.is_empty()))
    } else {
        dedupe(lines)
    }
}

/// Drop empty entries and duplicates, keeping first-seen order
fn dedupe<'a, I: Iterator<Item = &'a str>>(lines: I) -> Vec<String> {
    let mut seen = HashSet::new();
    lines
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}
