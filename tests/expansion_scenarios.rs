//! Scenario tests: monorepo template expanded for different change sets

mod helpers;

use buildpipe::core::step::{PROJECT_LABEL_ENV, PROJECT_PATH_ENV, SCOPE_ENV};
use buildpipe::core::{Pipeline, StepEntry};
use buildpipe::expansion::{expand, plan, Plan};
use helpers::*;

fn expanded(changed: &[&str]) -> Pipeline {
    match plan(&monorepo_config(), changed).unwrap() {
        Plan::Pipeline(pipeline) => pipeline,
        other => panic!("Expected a pipeline, got {:?}", other),
    }
}

#[test]
fn test_two_projects_affected() {
    let pipeline = expanded(&["project1/app.py", "shared/lib.py"]);

    assert_eq!(
        labels(&pipeline),
        vec![
            "bootstrap",
            "-",
            "test:project1",
            "test:project2",
            "build:project1",
            "build:project2",
            "-",
            "-",
            "deploy:project2",
            "tag",
        ]
    );
}

#[test]
fn test_dependencies_follow_project() {
    let pipeline = expanded(&["project1/app.py", "project2/main.go"]);

    assert_eq!(depends_on(step(&pipeline, "test:project1")), vec!["bootstrap"]);
    assert_eq!(
        depends_on(step(&pipeline, "build:project1")),
        vec!["bootstrap", "test:project1"]
    );
    assert_eq!(
        depends_on(step(&pipeline, "build:project2")),
        vec!["bootstrap", "test:project2"]
    );
    assert_eq!(depends_on(step(&pipeline, "deploy:project2")), vec!["build:project2"]);

    // Shared steps keep pointing at the template key
    assert_eq!(depends_on(step(&pipeline, "tag")), vec!["build"]);
}

#[test]
fn test_keys_are_unique() {
    let pipeline = expanded(&["project1/app.py", "project2/main.go", "project3/x"]);

    let keys: Vec<&str> = pipeline
        .steps
        .iter()
        .filter_map(StepEntry::as_step)
        .filter_map(|s| s.key.as_deref())
        .collect();
    assert_eq!(
        keys,
        vec![
            "bootstrap",
            "test:project1",
            "test:project2",
            "test:project3",
            "build:project1",
            "build:project2",
            "build:project3",
        ]
    );
}

#[test]
fn test_env_injection() {
    let pipeline = expanded(&["shared/lib.py"]);

    let test = step(&pipeline, "test:project2");
    assert_eq!(env(test, PROJECT_LABEL_ENV), Some("project2"));
    assert_eq!(env(test, PROJECT_PATH_ENV), Some("project2"));
    assert_eq!(env(test, "IMAGE_NAME"), Some("project2-image"));
    assert_eq!(env(test, "TEST_ENV_STEP"), Some("test-step"));
    assert_eq!(env(test, "TEAM"), Some("platform"));
    assert_eq!(env(test, SCOPE_ENV), Some("project"));

    let bootstrap = step(&pipeline, "bootstrap");
    assert_eq!(env(bootstrap, "TEAM"), Some("platform"));
    assert_eq!(env(bootstrap, PROJECT_LABEL_ENV), None);

    let block = pipeline
        .steps
        .iter()
        .filter_map(StepEntry::as_step)
        .find(|s| s.is_block())
        .expect("block step should pass through");
    assert_eq!(block.env, None);
}

#[test]
fn test_extra_fields_preserved() {
    let pipeline = expanded(&["project3/src/main.rs"]);

    let build = step(&pipeline, "build:project3");
    assert_eq!(
        build.extra.get("branches").and_then(|v| v.as_str()),
        Some("master")
    );
    let command: Vec<&str> = build
        .extra
        .get("command")
        .and_then(|v| v.as_sequence())
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(command, vec!["cd $$BUILDPIPE_PROJECT_PATH", "make build"]);
}

#[test]
fn test_skip_pattern_removes_only_that_project() {
    let pipeline = expanded(&["project1/app.py"]);

    assert!(labels(&pipeline).iter().all(|l| !l.starts_with("deploy")));
    assert!(labels(&pipeline).contains(&"test:project1".to_string()));
}

#[test]
fn test_no_changes_and_no_affected_projects() {
    let config = monorepo_config();
    let none: Vec<String> = vec![];

    assert_eq!(plan(&config, &none).unwrap(), Plan::NoChanges);
    assert_eq!(
        plan(&config, &["README.md", "docs/index.md"]).unwrap(),
        Plan::NoAffectedProjects
    );
    assert_eq!(
        plan(&config, &["project10/app.py"]).unwrap(),
        Plan::NoAffectedProjects
    );
}

#[test]
fn test_expansion_is_repeatable() {
    let config = monorepo_config();
    let registry = config.registry().unwrap();
    let affected = registry.affected(&["project2/a", "project1/b"]);

    let first = expand(&config.steps, &config.env, &affected).unwrap();
    let second = expand(&config.steps, &config.env, &affected).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_yaml().unwrap(), second.to_yaml().unwrap());
}

#[test]
fn test_output_yaml_round_trips() {
    let pipeline = expanded(&["project1/app.py", "shared/lib.py"]);

    let yaml = pipeline.to_yaml().unwrap();
    assert!(yaml.contains("- wait"));

    let reparsed: Pipeline = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(reparsed, pipeline);
}
