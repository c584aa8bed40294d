//! Pipeline run orchestration

pub mod runner;

pub use runner::{EventHandler, RunEvent, RunOutcome, Runner};
