//! Project domain model
//!
//! A project owns one or more path prefixes of the monorepo. It is affected
//! when any changed file lives under one of those prefixes.

use crate::core::error::{ConfigError, ExpandError};
use crate::core::step::{Env, Step};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Project path that matches the whole repository
pub const WHOLE_REPO: &str = ".";

/// A single string or a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl Default for StringOrList {
    fn default() -> Self {
        StringOrList::Many(Vec::new())
    }
}

impl StringOrList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            StringOrList::One(s) => vec![s],
            StringOrList::Many(v) => v,
        }
    }
}

/// Project configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Unique project label
    pub label: String,

    /// Path prefix or prefixes owned by the project
    pub path: StringOrList,

    /// Glob patterns of step labels to skip for this project
    #[serde(default)]
    pub skip: StringOrList,

    /// Extra env merged into every step generated for this project
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// A validated project
#[derive(Debug, Clone)]
pub struct Project {
    /// Unique project label, used as the step suffix
    pub label: String,

    /// Declared paths, never empty
    pub paths: Vec<String>,

    /// Compiled skip patterns
    pub skip: Vec<Pattern>,

    /// Env overrides for generated steps
    pub env: Env,
}

impl Project {
    /// Build a project from its config, validating paths and skip patterns
    pub fn new(config: ProjectConfig) -> Result<Self, ConfigError> {
        if config.label.is_empty() {
            return Err(ConfigError::EmptyLabel);
        }

        let paths = config.path.into_vec();
        if paths.is_empty() {
            return Err(ConfigError::NoPaths(config.label));
        }
        if paths.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::EmptyPath(config.label));
        }

        let skip = config
            .skip
            .into_vec()
            .into_iter()
            .map(|pattern| {
                Pattern::new(&pattern).map_err(|e| ConfigError::InvalidSkipPattern {
                    project: config.label.clone(),
                    pattern: pattern.clone(),
                    message: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Project {
            label: config.label,
            paths,
            skip,
            env: config.env.into_iter().collect(),
        })
    }

    /// The first declared path is the project's canonical root
    pub fn main_path(&self) -> &str {
        &self.paths[0]
    }

    /// Check whether the step should be generated for this project
    ///
    /// Returns `false` when any skip pattern matches the step label.
    pub fn check_project_rules(&self, step: &Step) -> Result<bool, ExpandError> {
        let label = step
            .label
            .as_deref()
            .ok_or_else(|| ExpandError::MissingLabel(step.describe()))?;

        if let Some(pattern) = self.skip.iter().find(|p| p.matches(label)) {
            debug!(
                "Skipping step '{}' for project '{}' (pattern '{}')",
                label,
                self.label,
                pattern.as_str()
            );
            return Ok(false);
        }
        Ok(true)
    }

    /// Check whether any changed file lives under one of the project's paths
    pub fn is_affected<S: AsRef<str>>(&self, changed_files: &[S]) -> bool {
        for path in &self.paths {
            let normalized = normalize_path(path);
            if normalized == WHOLE_REPO {
                return true;
            }

            let project_dirs: Vec<&str> = normalized.split('/').collect();
            for changed_file in changed_files {
                let changed_file = changed_file.as_ref();
                if changed_file.is_empty() {
                    continue;
                }
                let changed_dirs: Vec<&str> = changed_file.split('/').collect();
                if changed_dirs.len() >= project_dirs.len()
                    && changed_dirs[..project_dirs.len()] == project_dirs[..]
                {
                    return true;
                }
            }
        }
        false
    }
}

/// Lexically clean a slash-separated path
///
/// Collapses repeated separators, `.` and `..` elements and drops any
/// trailing slash. An empty result becomes `.`.
pub fn normalize_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last().copied() {
                Some(last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => WHOLE_REPO.to_string(),
        (false, false) => joined,
    }
}

/// The declared projects, in declaration order
#[derive(Debug, Clone, Default)]
pub struct ProjectRegistry {
    projects: Vec<Project>,
}

impl ProjectRegistry {
    /// Create a registry, rejecting duplicate labels
    ///
    /// Order is the declaration order and is kept as-is: it decides the order
    /// of expanded step instances.
    pub fn new(projects: Vec<Project>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for project in &projects {
            if !seen.insert(project.label.as_str()) {
                return Err(ConfigError::DuplicateProject(project.label.clone()));
            }
        }
        Ok(Self { projects })
    }

    /// Build a registry from project configs
    pub fn from_configs(configs: Vec<ProjectConfig>) -> Result<Self, ConfigError> {
        let projects = configs
            .into_iter()
            .map(Project::new)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(projects)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Projects touched by the change set, in registry order
    pub fn affected<S: AsRef<str>>(&self, changed_files: &[S]) -> Vec<Project> {
        let affected: Vec<Project> = self
            .projects
            .iter()
            .filter(|p| p.is_affected(changed_files))
            .cloned()
            .collect();

        debug!(
            "Affected projects: {:?}",
            affected.iter().map(|p| p.label.as_str()).collect::<Vec<_>>()
        );
        affected
    }
}
