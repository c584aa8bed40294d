//! CLI command definitions

use clap::Args;
use std::path::PathBuf;

/// Detect changes, expand the template and upload it
#[derive(Debug, Args, Clone, Default)]
pub struct RunCommand {
    /// Print the pipeline instead of uploading it
    #[arg(long)]
    pub dry_run: bool,
}

/// Expand a template for a given list of changed files
#[derive(Debug, Args, Clone)]
pub struct ExpandCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Changed file (repeatable)
    #[arg(short, long = "changed", value_name = "PATH")]
    pub changed: Vec<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Validate a pipeline template
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
