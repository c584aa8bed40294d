//! Pipeline expansion engine
//!
//! Turns a template into a concrete pipeline: every project-scoped step is
//! replaced by one step per affected project, all other entries pass through
//! in place.
//!
//! Env precedence for a generated step, lowest first: the step's own env,
//! the pipeline env, the injected `BUILDPIPE_PROJECT_*` variables, the
//! project's env overrides.

pub mod dependencies;

use crate::core::{
    config::PipelineConfig,
    error::{ConfigError, ExpandError},
    pipeline::Pipeline,
    project::Project,
    step::{uniquify, Env, Step, StepEntry, PROJECT_LABEL_ENV, PROJECT_PATH_ENV},
};
use dependencies::ScopedKeys;
use tracing::{debug, info};

/// Result of planning a pipeline for a change set
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// The change set is empty
    NoChanges,
    /// Files changed, but no project owns any of them
    NoAffectedProjects,
    /// Expanded pipeline
    Pipeline(Pipeline),
}

/// Compute affected projects and expand the template for them
pub fn plan<S: AsRef<str>>(
    config: &PipelineConfig,
    changed_files: &[S],
) -> Result<Plan, ConfigError> {
    if changed_files.iter().all(|f| f.as_ref().is_empty()) {
        info!("No files were changed");
        return Ok(Plan::NoChanges);
    }

    let registry = config.registry()?;
    let affected = registry.affected(changed_files);
    if affected.is_empty() {
        info!("No project was affected from changes");
        return Ok(Plan::NoAffectedProjects);
    }

    let pipeline = expand(&config.steps, &config.env, &affected)?;
    Ok(Plan::Pipeline(pipeline))
}

/// Expand template steps over the affected projects
///
/// Output keeps template order. The instances of a project-scoped step sit
/// where the template step was, in project order. A scoped step that no
/// project keeps produces nothing.
pub fn expand(
    template: &[StepEntry],
    pipeline_env: &Env,
    projects: &[Project],
) -> Result<Pipeline, ExpandError> {
    let prepared: Vec<StepEntry> = template
        .iter()
        .cloned()
        .map(|entry| match entry {
            StepEntry::Step(mut step) => {
                step.merge_pipeline_env(pipeline_env);
                StepEntry::Step(step)
            }
            other => other,
        })
        .collect();

    // Fail before producing anything
    for (position, entry) in prepared.iter().enumerate() {
        if let StepEntry::Step(step) = entry {
            if step.is_project_scoped() && step.label.is_none() {
                return Err(ExpandError::MissingLabel(format!(
                    "{} at position {}",
                    step.describe(),
                    position
                )));
            }
        }
    }

    let scoped_keys = ScopedKeys::collect(&prepared);
    let mut steps = Vec::with_capacity(prepared.len());

    for entry in prepared {
        match entry {
            StepEntry::Step(step) if step.is_project_scoped() => {
                let instances = generate_project_steps(&step, projects, &scoped_keys)?;
                if instances.is_empty() {
                    debug!("Step {} expanded to no project steps", step.describe());
                }
                steps.extend(instances.into_iter().map(StepEntry::Step));
            }
            other => steps.push(other),
        }
    }

    debug!("Generated {} steps from {} template entries", steps.len(), template.len());
    Ok(Pipeline::new(steps))
}

/// One instance of a scoped step per project that does not skip it
fn generate_project_steps(
    step: &Step,
    projects: &[Project],
    scoped_keys: &ScopedKeys,
) -> Result<Vec<Step>, ExpandError> {
    let mut project_steps = Vec::new();
    for project in projects {
        if project.check_project_rules(step)? {
            project_steps.push(instantiate(step, project, scoped_keys));
        }
    }
    Ok(project_steps)
}

/// Build the step instance for a single project
fn instantiate(step: &Step, project: &Project, scoped_keys: &ScopedKeys) -> Step {
    let mut instance = step.clone();

    if let Some(label) = &step.label {
        instance.label = Some(uniquify(label, &project.label));
    }

    let env = instance.env_mut();
    env.insert(PROJECT_LABEL_ENV.to_string(), project.label.clone());
    env.insert(PROJECT_PATH_ENV.to_string(), project.main_path().to_string());
    env.extend(project.env.iter().map(|(k, v)| (k.clone(), v.clone())));

    if let Some(key) = &step.key {
        instance.key = Some(uniquify(key, &project.label));
    }

    if let Some(dependencies) = &step.depends_on {
        instance.depends_on = Some(scoped_keys.rewrite(dependencies, &project.label));
    }

    instance
}
