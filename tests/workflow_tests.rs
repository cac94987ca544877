//! Integration tests for status workflows loaded from settings files.

use std::fs;
use tempfile::TempDir;
use tierkit::config::{STATUSES_FILE, SettingsLoader, SettingsPaths};
use tierkit::error::WorkflowError;
use tierkit::workflow::StatusSet;

const REVIEW_WORKFLOW: &str = r#"
statuses:
  - id: OPEN
    name: Open
    isInitial: true
    allowedTransitionIds: [IN_REVIEW]
  - id: IN_REVIEW
    name: In review
    allowedTransitionIds: [OPEN, DONE]
  - id: DONE
    name: Done
    isFinal: true
"#;

#[test]
fn test_default_spike_transitions() {
    let statuses = StatusSet::default_spike();
    assert_eq!(statuses.get_allowed_transitions("DRAFT"), vec!["SUBMITTED"]);
    assert!(statuses.get_allowed_transitions("ARCHIVED").is_empty());
    assert_eq!(
        statuses.get_allowed_transitions("REJECTED"),
        vec!["DRAFT", "ARCHIVED"]
    );

    // Reporting a target never implies applying it; the guard decides.
    for target in ["APPROVED", "REJECTED", "ARCHIVED"] {
        assert!(matches!(
            statuses.check_transition("DRAFT", target),
            Err(WorkflowError::IllegalTransition { .. })
        ));
    }
}

#[test]
fn test_workflow_path_from_project_settings() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    fs::create_dir_all(&project).unwrap();
    let workflow_path = project.join("statuses.yaml");
    fs::write(&workflow_path, REVIEW_WORKFLOW).unwrap();
    fs::write(
        project.join("settings.yaml"),
        format!("workflow:\n  path: {}\n", workflow_path.display()),
    )
    .unwrap();

    let paths = SettingsPaths::with_dirs(Some(project), Some(temp.path().join("user")));
    let settings = SettingsLoader::load_with_paths(paths).unwrap().into_settings();
    let path = settings.workflow.path.expect("workflow path set");

    let statuses = StatusSet::from_yaml(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(statuses.initial().unwrap().id, "OPEN");
    statuses.check_transition("IN_REVIEW", "DONE").unwrap();
    assert!(statuses.check_transition("DONE", "OPEN").is_err());
}

#[test]
fn test_project_statuses_file_discovered() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    fs::create_dir_all(&project).unwrap();
    fs::write(project.join(STATUSES_FILE), REVIEW_WORKFLOW).unwrap();

    let paths = SettingsPaths::with_dirs(Some(project.clone()), Some(temp.path().join("user")));
    let settings = SettingsLoader::load_with_paths(paths).unwrap().into_settings();
    assert_eq!(settings.workflow.path, Some(project.join(STATUSES_FILE)));

    let statuses = StatusSet::from_yaml(&fs::read_to_string(project.join(STATUSES_FILE)).unwrap())
        .unwrap();
    assert_eq!(statuses.initial().unwrap().id, "OPEN");
}

#[test]
fn test_without_statuses_file_workflow_is_unset() {
    let temp = TempDir::new().unwrap();
    let paths = SettingsPaths::with_dirs(
        Some(temp.path().join("project")),
        Some(temp.path().join("user")),
    );
    let settings = SettingsLoader::load_with_paths(paths).unwrap().into_settings();
    assert!(settings.workflow.path.is_none());
}

#[test]
fn test_invalid_workflow_rejected() {
    let yaml = r#"
- id: A
  name: A
  isInitial: true
  allowedTransitionIds: [B]
- id: B
  name: B
  isFinal: true
  allowedTransitionIds: [A]
"#;
    let err = StatusSet::from_yaml(yaml).unwrap_err();
    assert!(matches!(err, WorkflowError::Invalid(_)));
}
