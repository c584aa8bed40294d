//! Error types for template and expansion failures

use thiserror::Error;

/// Errors raised while building projects and loading the template
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Project label must not be empty")]
    EmptyLabel,

    #[error("Project '{0}' declares no path")]
    NoPaths(String),

    #[error("Project '{0}' declares an empty path")]
    EmptyPath(String),

    #[error("Project '{project}' has invalid skip pattern '{pattern}': {message}")]
    InvalidSkipPattern {
        project: String,
        pattern: String,
        message: String,
    },

    #[error("Duplicate project label: {0}")]
    DuplicateProject(String),

    #[error("Duplicate step key: {0}")]
    DuplicateKey(String),

    #[error(transparent)]
    Expand(#[from] ExpandError),
}

/// Errors raised by the expansion engine on invalid input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpandError {
    #[error("Project-scoped step {0} has no label")]
    MissingLabel(String),
}
