//! Core domain models for buildpipe
//!
//! This module defines the template, project and step data structures the
//! expansion engine works on.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod project;
pub mod step;

pub use error::{ConfigError, ExpandError};
pub use pipeline::*;
pub use project::{Project, ProjectConfig, ProjectRegistry};
pub use step::{Dependency, Env, Step, StepEntry};
