//! Test utility functions for buildpipe
#![allow(dead_code)]

use async_trait::async_trait;
use buildpipe::agent::{AgentError, PipelineUploader};
use buildpipe::changes::{ChangedFilesProvider, ChangesError};
use buildpipe::core::{config::PipelineConfig, Pipeline, Step};
use std::sync::{Arc, Mutex};

/// Template shared by the scenario tests
pub const MONOREPO_TEMPLATE: &str = include_str!("fixtures/monorepo.yml");

pub fn monorepo_config() -> PipelineConfig {
    PipelineConfig::from_yaml(MONOREPO_TEMPLATE).expect("fixture template should be valid")
}

/// Mock provider that returns a predefined change set
pub struct MockChanges {
    files: Result<Vec<String>, String>,
}

impl MockChanges {
    pub fn new(files: &[&str]) -> Self {
        Self {
            files: Ok(files.iter().map(|f| f.to_string()).collect()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            files: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl ChangedFilesProvider for MockChanges {
    async fn changed_files(&self) -> Result<Vec<String>, ChangesError> {
        match &self.files {
            Ok(files) => Ok(files.clone()),
            Err(message) => Err(ChangesError::Command {
                command: "git log".to_string(),
                code: 128,
                stderr: message.clone(),
            }),
        }
    }
}

/// Mock uploader that records uploaded pipelines
#[derive(Clone, Default)]
pub struct MockUploader {
    uploads: Arc<Mutex<Vec<Pipeline>>>,
    fail: bool,
}

impl MockUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn uploads(&self) -> Vec<Pipeline> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl PipelineUploader for MockUploader {
    async fn upload(&self, pipeline: &Pipeline) -> Result<(), AgentError> {
        if self.fail {
            return Err(AgentError::Upload("MockUploader: upload rejected".to_string()));
        }
        self.uploads.lock().unwrap().push(pipeline.clone());
        Ok(())
    }
}

/// Labels of the pipeline, with `-` for entries without one
pub fn labels(pipeline: &Pipeline) -> Vec<String> {
    pipeline
        .labels()
        .into_iter()
        .map(|l| l.unwrap_or("-").to_string())
        .collect()
}

/// Find a step by label
pub fn step<'a>(pipeline: &'a Pipeline, label: &str) -> &'a Step {
    pipeline
        .steps
        .iter()
        .filter_map(|e| e.as_step())
        .find(|s| s.label.as_deref() == Some(label))
        .unwrap_or_else(|| panic!("Step '{}' not found in {:?}", label, labels(pipeline)))
}

/// Keys a step depends on
pub fn depends_on(step: &Step) -> Vec<String> {
    step.depends_on
        .as_ref()
        .map(|deps| deps.iter().map(|d| d.key().to_string()).collect())
        .unwrap_or_default()
}

/// Env value of a step
pub fn env<'a>(step: &'a Step, name: &str) -> Option<&'a str> {
    step.env.as_ref().and_then(|e| e.get(name)).map(String::as_str)
}
