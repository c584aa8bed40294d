//! Pipeline domain model

use crate::core::step::StepEntry;
use serde::{Deserialize, Serialize};

/// An expanded pipeline, ready to hand to the Buildkite agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Steps in execution order
    pub steps: Vec<StepEntry>,
}

impl Pipeline {
    pub fn new(steps: Vec<StepEntry>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Labels of all step entries, in order (`None` for entries without one)
    pub fn labels(&self) -> Vec<Option<&str>> {
        self.steps.iter().map(StepEntry::label).collect()
    }

    /// Serialize as a Buildkite pipeline document
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::step::Step;
    use serde_yaml::Value;

    #[test]
    fn test_to_yaml() {
        let pipeline = Pipeline::new(vec![
            Step {
                label: Some("build:api".to_string()),
                ..Default::default()
            }
            .into(),
            StepEntry::Other(Value::String("wait".to_string())),
        ]);

        let yaml = pipeline.to_yaml().unwrap();
        assert!(yaml.starts_with("steps:\n"));
        assert!(yaml.contains("- wait\n"));

        let reparsed: Pipeline = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(reparsed, pipeline);
        assert_eq!(pipeline.labels(), vec![Some("build:api"), None]);
    }
}
