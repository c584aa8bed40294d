//! `depends_on` rewriting for project step instances

use crate::core::step::{uniquify, Dependency, StepEntry};
use std::collections::HashMap;

/// Template step keys and whether each belongs to a project-scoped step
///
/// Built from the template after the pipeline env merge, so scope is judged
/// the same way the engine judges it when emitting steps.
#[derive(Debug, Clone, Default)]
pub struct ScopedKeys {
    keys: HashMap<String, bool>,
}

impl ScopedKeys {
    /// Collect the keys declared by the template
    pub fn collect(template: &[StepEntry]) -> Self {
        let keys = template
            .iter()
            .filter_map(StepEntry::as_step)
            .filter_map(|step| {
                step.key
                    .as_ref()
                    .map(|key| (key.clone(), step.is_project_scoped()))
            })
            .collect();
        Self { keys }
    }

    /// `Some(true)` for a project-scoped key, `None` if no step declares it
    pub fn is_scoped(&self, key: &str) -> Option<bool> {
        self.keys.get(key).copied()
    }

    /// Point dependencies on project-scoped steps at this project's instance
    ///
    /// References to shared steps and to unknown keys are kept as-is: they
    /// target a single step in the output. Skip rules are not consulted, so
    /// a project that skips a scoped step still gets references to its own
    /// (absent) instance of it.
    pub fn rewrite(&self, dependencies: &[Dependency], project_label: &str) -> Vec<Dependency> {
        dependencies
            .iter()
            .map(|dep| match self.is_scoped(dep.key()) {
                Some(true) => dep.with_key(uniquify(dep.key(), project_label)),
                _ => dep.clone(),
            })
            .collect()
    }
}
