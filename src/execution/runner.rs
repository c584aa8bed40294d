//! Run orchestration - changes, expansion, upload

use crate::{
    agent::PipelineUploader,
    changes::ChangedFilesProvider,
    core::{config::PipelineConfig, Pipeline},
    expansion::{plan, Plan},
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Events that can occur during a run
#[derive(Debug, Clone)]
pub enum RunEvent {
    ChangesDetected { files: Vec<String> },
    PipelineGenerated { pipeline: Pipeline },
    PipelineUploaded { steps: usize },
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No files changed, nothing to do
    NoChanges,
    /// No project owns a changed file, nothing to do
    NoAffectedProjects,
    /// Every step was skipped, nothing was uploaded
    EmptyPipeline,
    /// Pipeline submitted
    Uploaded { steps: usize },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&RunEvent) + Send + Sync>;

/// Drives one buildpipe run
pub struct Runner<C, U> {
    changes: C,
    uploader: U,
    event_handlers: Vec<EventHandler>,
}

impl<C: ChangedFilesProvider, U: PipelineUploader> Runner<C, U> {
    pub fn new(changes: C, uploader: U) -> Self {
        Self {
            changes,
            uploader,
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn with_event_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&RunEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
        self
    }

    fn emit(&self, event: RunEvent) {
        for handler in &self.event_handlers {
            handler(&event);
        }
    }

    /// Expand the template for the current changes and upload the result
    pub async fn run(&self, config: &PipelineConfig) -> Result<RunOutcome> {
        let files = self
            .changes
            .changed_files()
            .await
            .context("Failed to determine changed files")?;
        self.emit(RunEvent::ChangesDetected {
            files: files.clone(),
        });

        let pipeline = match plan(config, &files).context("Failed to expand pipeline")? {
            Plan::NoChanges => return Ok(RunOutcome::NoChanges),
            Plan::NoAffectedProjects => return Ok(RunOutcome::NoAffectedProjects),
            Plan::Pipeline(pipeline) => pipeline,
        };

        if pipeline.is_empty() {
            warn!("Expanded pipeline has no steps, skipping upload");
            return Ok(RunOutcome::EmptyPipeline);
        }

        self.emit(RunEvent::PipelineGenerated {
            pipeline: pipeline.clone(),
        });

        self.uploader
            .upload(&pipeline)
            .await
            .context("Failed to upload pipeline")?;

        let steps = pipeline.len();
        info!("Pipeline uploaded ({} steps)", steps);
        self.emit(RunEvent::PipelineUploaded { steps });
        Ok(RunOutcome::Uploaded { steps })
    }
}
