//! Integration tests for form loading and engine rendering.
//!
//! Documents are written to a temp directory and read back through
//! `DirSource`, the same path the CLI uses for a local forms base.

use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tierkit::error::FormError;
use tierkit::forms::{
    FieldType, FormEngine, FormLoader, FormMode, create_default_model, to_field_config, to_schema,
};
use tierkit::source::DirSource;

const SPIKE_EDIT: &str = r#"
id: spike
title: Edit Spike
description: Spike record
fields:
  - key: name
    type: text
    label: Name
    required: true
    validation:
      minLength: 3
      messages:
        minlength: Too short
  - key: email
    type: email
    label: Contact
  - key: notes
    type: textarea
  - key: tags
    type: multiselect
    label: Tags
    options:
      - { value: a, label: A }
      - { value: b, label: B }
  - key: status
    type: select
    label: Status
    defaultValue: DRAFT
    options:
      - { value: DRAFT, label: Draft }
      - { value: SUBMITTED, label: Submitted }
  - key: owner
    type: object
    label: Owner
    fieldGroup:
      - { key: first, type: text, label: First, required: true }
      - { key: last, type: text, label: Last }
  - key: secret
    type: hidden
  - key: rating
    type: star-rating
    label: Rating
layout:
  columns: 2
  sections:
    - title: Basics
      fieldKeys: [name, email, status]
"#;

fn forms_dir(documents: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (name, content) in documents {
        fs::write(temp.path().join(name), content).unwrap();
    }
    temp
}

fn loader(dir: &TempDir) -> FormLoader {
    FormLoader::new(Arc::new(DirSource::new(dir.path())))
}

#[tokio::test]
async fn test_add_falls_back_to_edit_on_disk() {
    let dir = forms_dir(&[("spike.edit.form.yml", SPIKE_EDIT)]);
    let loader = loader(&dir);

    let add = loader.load("spike", FormMode::Add).await.unwrap();
    let edit = loader.load("spike", FormMode::Edit).await.unwrap();

    assert_eq!(add.mode, FormMode::Add);
    assert_eq!(add.id, "spike-add");
    assert_eq!(add.title.as_deref(), Some("Create New Spike"));
    assert_eq!(add.fields, edit.fields);
    assert_eq!(add.layout, edit.layout);
}

#[tokio::test]
async fn test_explicit_add_form_wins() {
    let dir = forms_dir(&[
        ("spike.edit.form.yml", SPIKE_EDIT),
        (
            "spike.add.form.json",
            r#"{"id": "spike-new", "title": "New", "fields": [{"key": "name", "type": "text"}]}"#,
        ),
    ]);
    let add = loader(&dir).load("spike", FormMode::Add).await.unwrap();
    assert_eq!(add.id, "spike-new");
    assert_eq!(add.mode, FormMode::Add);
}

#[tokio::test]
async fn test_missing_everything_is_not_found() {
    let dir = forms_dir(&[]);
    let err = loader(&dir).load("spike", FormMode::View).await.unwrap_err();
    assert!(matches!(err, FormError::NotFound { .. }));
    let message = err.to_string();
    assert!(message.contains("spike") && message.contains("view"));
}

#[tokio::test]
async fn test_layout_referencing_unknown_field_is_rejected() {
    let dir = forms_dir(&[(
        "spike.edit.form.yml",
        "id: spike\nfields:\n  - { key: name, type: text }\nlayout:\n  sections:\n    - { title: A, fieldKeys: [name, ghost] }\n",
    )]);
    let err = loader(&dir).load("spike", FormMode::Edit).await.unwrap_err();
    assert!(matches!(err, FormError::InvalidField { ref key, .. } if key == "ghost"));
}

#[tokio::test]
async fn test_formly_projection() {
    let dir = forms_dir(&[("spike.edit.form.yml", SPIKE_EDIT)]);
    let form = loader(&dir).load("spike", FormMode::Edit).await.unwrap();
    let fields = to_field_config(&form, false);

    let by_key = |key: &str| fields.iter().find(|f| f.key == key).unwrap();
    assert_eq!(by_key("name").field_type, "input");
    assert_eq!(by_key("name").props.input_type.as_deref(), Some("text"));
    assert_eq!(by_key("name").props.min_length, Some(3));
    assert_eq!(
        by_key("name").validation.as_ref().unwrap().messages["minlength"],
        "Too short"
    );
    assert_eq!(by_key("email").props.input_type.as_deref(), Some("email"));
    assert_eq!(by_key("notes").field_type, "textarea");
    assert_eq!(by_key("notes").props.label, "Notes");
    assert_eq!(by_key("tags").field_type, "select");
    assert!(by_key("tags").props.multiple);
    assert!(by_key("secret").hide);
    assert_eq!(by_key("owner").field_group.as_ref().unwrap().len(), 2);

    // Unknown types degrade to a plain input.
    assert_eq!(
        form.field("rating").unwrap().field_type,
        FieldType::Unknown("star-rating".to_string())
    );
    assert_eq!(by_key("rating").field_type, "input");

    let readonly = to_field_config(&form, true);
    assert!(readonly.iter().all(|f| f.field_type == "label"));
}

#[tokio::test]
async fn test_json_forms_projection() {
    let dir = forms_dir(&[("spike.edit.form.yml", SPIKE_EDIT)]);
    let form = loader(&dir).load("spike", FormMode::Edit).await.unwrap();
    let output = to_schema(&form, false);

    let schema = &output.schema;
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["required"], json!(["name"]));
    assert_eq!(schema["properties"]["email"]["format"], "email");
    assert_eq!(schema["properties"]["status"]["enum"], json!(["DRAFT", "SUBMITTED"]));
    assert_eq!(schema["properties"]["status"]["default"], "DRAFT");
    assert_eq!(schema["properties"]["owner"]["type"], "object");
    assert_eq!(schema["properties"]["owner"]["required"], json!(["first"]));
    assert_eq!(schema["properties"]["rating"]["type"], "string");

    let elements = output.uischema["elements"].as_array().unwrap();
    assert_eq!(output.uischema["type"], "VerticalLayout");
    assert_eq!(elements[0]["type"], "Group");
    assert_eq!(elements[0]["elements"].as_array().unwrap().len(), 3);
    // Remaining fields follow the group.
    assert_eq!(elements.len(), 1 + form.fields.len() - 3);
    assert_eq!(elements[1]["scope"], "#/properties/notes");
}

#[tokio::test]
async fn test_engine_from_settings_and_default_model() {
    let dir = forms_dir(&[("spike.edit.form.yml", SPIKE_EDIT)]);
    let form = loader(&dir).load("spike", FormMode::Add).await.unwrap();

    let rendered = FormEngine::JsonForms.adapter().render(&form, true);
    assert_eq!(rendered["schema"]["properties"]["name"]["readOnly"], true);

    let rendered = FormEngine::Formly.adapter().render(&form, false);
    assert!(rendered.as_array().is_some_and(|fields| fields.len() == form.fields.len()));

    let model = create_default_model(&form);
    assert_eq!(model.len(), 1);
    assert_eq!(model["status"], "DRAFT");
}
