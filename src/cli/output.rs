//! CLI output formatting

use crate::core::{config::PipelineConfig, Pipeline};
use crate::execution::{RunEvent, RunOutcome};
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Format a run event for display
pub fn format_run_event(event: &RunEvent) -> String {
    match event {
        RunEvent::ChangesDetected { files } => format!(
            "{} {} changed files",
            INFO,
            style(files.len()).cyan()
        ),
        RunEvent::PipelineGenerated { pipeline } => format!(
            "{} Generated pipeline with {} steps:\n{}",
            INFO,
            style(pipeline.len()).cyan(),
            format_step_list(pipeline)
        ),
        RunEvent::PipelineUploaded { steps } => format!(
            "{} Uploaded {} steps",
            ROCKET,
            style(steps).cyan()
        ),
    }
}

/// Format how a run ended
pub fn format_outcome(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::NoChanges => format!("{} No files were changed", INFO),
        RunOutcome::NoAffectedProjects => {
            format!("{} No project was affected from changes", INFO)
        }
        RunOutcome::EmptyPipeline => format!(
            "{} Every project step was skipped, {}",
            INFO,
            style("nothing uploaded").dim()
        ),
        RunOutcome::Uploaded { steps } => format!(
            "{} Pipeline uploaded {}",
            CHECK,
            style(format!("({} steps)", steps)).green()
        ),
    }
}

/// One line per step entry
pub fn format_step_list(pipeline: &Pipeline) -> String {
    pipeline
        .labels()
        .iter()
        .map(|label| match label {
            Some(label) => format!("  - {}", style(label).bold()),
            None => format!("  - {}", style("(unlabelled)").dim()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary of a valid template
pub fn format_template_summary(config: &PipelineConfig) -> String {
    let projects = config
        .projects
        .iter()
        .map(|p| p.label.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{} Pipeline template is valid!\n  Projects: {} ({})\n  Steps: {}\n  Env: {}",
        CHECK,
        style(config.projects.len()).cyan(),
        projects,
        style(config.steps.len()).cyan(),
        style(config.env.len()).cyan()
    )
}
