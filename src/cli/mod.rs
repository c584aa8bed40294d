//! Command-line interface

pub mod commands;
pub mod output;
pub mod settings;

use clap::{Parser, Subcommand};
use commands::{ExpandCommand, RunCommand, ValidateCommand};
pub use settings::Settings;

/// Dynamically generate Buildkite pipelines for monorepos
#[derive(Debug, Parser, Clone)]
#[command(name = "buildpipe")]
#[command(version)]
#[command(about = "Dynamically generate Buildkite pipelines for monorepos", long_about = None)]
pub struct Cli {
    /// Defaults to `run`
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub settings: Settings,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Detect changes, expand the template and upload it
    Run(RunCommand),

    /// Expand a template for a given list of changed files
    Expand(ExpandCommand),

    /// Validate a pipeline template
    Validate(ValidateCommand),
}

impl Default for Command {
    fn default() -> Self {
        Command::Run(RunCommand::default())
    }
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

use std::ffi::OsString;
