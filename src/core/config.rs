//! Pipeline template configuration from YAML

use crate::core::{
    error::{ConfigError, ExpandError},
    project::{ProjectConfig, ProjectRegistry},
    step::{Env, StepEntry},
};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::HashSet;
use std::path::Path;

/// Top-level dynamic pipeline template loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Projects of the monorepo
    pub projects: Vec<ProjectConfig>,

    /// Template steps
    pub steps: Vec<StepEntry>,

    /// Env merged into every non-block step
    #[serde(default)]
    pub env: Env,
}

impl PipelineConfig {
    /// Load pipeline template from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse pipeline template from YAML string
    ///
    /// Merge keys (`<<: *anchor`) are resolved first, so steps inheriting
    /// their env from an anchor keep the inherited scope marker.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let mut value: Value = serde_yaml::from_str(yaml)?;
        value.apply_merge()?;
        let config: PipelineConfig = serde_yaml::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the pipeline template
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.registry()?;

        let mut seen_keys = HashSet::new();
        for step in self.steps.iter().filter_map(StepEntry::as_step) {
            if let Some(key) = &step.key {
                if !seen_keys.insert(key) {
                    return Err(ConfigError::DuplicateKey(key.clone()));
                }
            }

            // The pipeline env can carry the scope marker too
            let mut merged = step.clone();
            merged.merge_pipeline_env(&self.env);
            if merged.is_project_scoped() && merged.label.is_none() {
                return Err(ExpandError::MissingLabel(step.describe()).into());
            }
        }

        Ok(())
    }

    /// Build the validated project registry
    pub fn registry(&self) -> Result<ProjectRegistry, ConfigError> {
        ProjectRegistry::from_configs(self.projects.clone())
    }
}
