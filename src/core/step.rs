//! Step document model
//!
//! Template steps are schema-free Buildkite documents. Only the fields the
//! expansion engine needs are typed; everything else is carried in
//! [`Step::extra`] and written back out untouched.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Env key marking a step as project-scoped
pub const SCOPE_ENV: &str = "BUILDPIPE_SCOPE";

/// Value of [`SCOPE_ENV`] that requests one step per affected project
pub const PROJECT_SCOPE: &str = "project";

/// Injected into every expanded step: the project's label
pub const PROJECT_LABEL_ENV: &str = "BUILDPIPE_PROJECT_LABEL";

/// Injected into every expanded step: the project's main path
pub const PROJECT_PATH_ENV: &str = "BUILDPIPE_PROJECT_PATH";

/// Joins a step label or key with the project label
pub const SEPARATOR: &str = ":";

/// Step environment, kept sorted so output is stable
pub type Env = BTreeMap<String, String>;

/// Append the project suffix to a label or key
pub fn uniquify(value: &str, suffix: &str) -> String {
    format!("{}{}{}", value, SEPARATOR, suffix)
}

/// One entry of a pipeline's `steps` list
#[derive(Debug, Clone, PartialEq)]
pub enum StepEntry {
    /// A step mapping
    Step(Step),
    /// Anything else, e.g. the bare `wait` marker
    Other(Value),
}

impl StepEntry {
    /// Get the step, if this entry is one
    pub fn as_step(&self) -> Option<&Step> {
        match self {
            StepEntry::Step(step) => Some(step),
            StepEntry::Other(_) => None,
        }
    }

    /// Label of the entry, for display
    pub fn label(&self) -> Option<&str> {
        self.as_step().and_then(|s| s.label.as_deref())
    }
}

impl<'de> Deserialize<'de> for StepEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::Mapping(_) => serde_yaml::from_value(value)
                .map(StepEntry::Step)
                .map_err(de::Error::custom),
            other => Ok(StepEntry::Other(other)),
        }
    }
}

impl Serialize for StepEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StepEntry::Step(step) => step.serialize(serializer),
            StepEntry::Other(value) => value.serialize(serializer),
        }
    }
}

impl From<Step> for StepEntry {
    fn from(step: Step) -> Self {
        StepEntry::Step(step)
    }
}

/// A step mapping with its recognized fields pulled out
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Display label
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_scalar"
    )]
    pub label: Option<String>,

    /// Key other steps use in `depends_on`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_scalar"
    )]
    pub key: Option<String>,

    /// Step environment
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_env"
    )]
    pub env: Option<Env>,

    /// Keys of steps this step waits for
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_depends_on"
    )]
    pub depends_on: Option<Vec<Dependency>>,

    /// Every other field (command, agents, plugins, ...)
    #[serde(flatten)]
    pub extra: Mapping,
}

impl Step {
    /// Whether this is a manual `block` step
    pub fn is_block(&self) -> bool {
        matches!(self.extra.get("block"), Some(Value::String(_)))
    }

    /// Value of the scope marker, if set
    pub fn scope(&self) -> Option<&str> {
        self.env
            .as_ref()
            .and_then(|env| env.get(SCOPE_ENV))
            .map(String::as_str)
    }

    /// Whether the step is replicated once per affected project
    pub fn is_project_scoped(&self) -> bool {
        self.scope() == Some(PROJECT_SCOPE)
    }

    /// Get the environment, creating an empty one if absent
    pub fn env_mut(&mut self) -> &mut Env {
        self.env.get_or_insert_with(Env::new)
    }

    /// Merge the pipeline env into the step env, pipeline values winning
    ///
    /// Block steps are never env-injected. Any other step ends up with an env
    /// mapping, even an empty one.
    pub fn merge_pipeline_env(&mut self, pipeline_env: &Env) {
        if self.is_block() {
            return;
        }
        let env = self.env_mut();
        for (name, value) in pipeline_env {
            env.insert(name.clone(), value.clone());
        }
    }

    /// Short name for error messages
    pub fn describe(&self) -> String {
        match (&self.label, &self.key) {
            (Some(label), _) => format!("'{}'", label),
            (None, Some(key)) => format!("with key '{}'", key),
            (None, None) => "(unnamed)".to_string(),
        }
    }
}

/// A `depends_on` entry: a bare key or `{step: key, ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dependency {
    Key(String),
    Step {
        step: String,
        #[serde(flatten)]
        extra: Mapping,
    },
}

impl Dependency {
    /// The referenced step key
    pub fn key(&self) -> &str {
        match self {
            Dependency::Key(key) => key,
            Dependency::Step { step, .. } => step,
        }
    }

    /// Same dependency pointing at another key
    pub fn with_key(&self, key: String) -> Self {
        match self {
            Dependency::Key(_) => Dependency::Key(key),
            Dependency::Step { extra, .. } => Dependency::Step {
                step: key,
                extra: extra.clone(),
            },
        }
    }
}

impl From<&str> for Dependency {
    fn from(key: &str) -> Self {
        Dependency::Key(key.to_string())
    }
}

fn deserialize_scalar<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_to_string(&value)
            .map(Some)
            .ok_or_else(|| de::Error::custom("expected a scalar")),
    }
}

fn deserialize_env<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Env>, D::Error> {
    let Some(mapping) = Option::<Mapping>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let mut env = Env::new();
    for (name, value) in mapping {
        let name = scalar_to_string(&name)
            .ok_or_else(|| de::Error::custom("env variable names must be scalars"))?;
        let value = scalar_to_string(&value).ok_or_else(|| {
            de::Error::custom(format!("env variable '{}' must be a scalar", name))
        })?;
        env.insert(name, value);
    }
    Ok(Some(env))
}

fn deserialize_depends_on<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<Dependency>>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Dependency),
        Many(Vec<Dependency>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => None,
        Some(OneOrMany::One(dep)) => Some(vec![dep]),
        Some(OneOrMany::Many(deps)) => Some(deps),
    })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
