//! Formly-style field configuration.
//!
//! Each abstract field becomes one field config whose `type` comes from a
//! fixed lookup table. Readonly fields become `label` displays.

use super::definition::{FieldOption, FieldType, FormDefinition, FormFieldDefinition};
use super::engine::{FormEngine, FormEngineAdapter, display_label};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Control type used for display-only fields.
pub const READONLY_TYPE: &str = "label";

/// Engine-native field config.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormlyFieldConfig {
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub props: FormlyProps,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<FormlyValidation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expressions: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_expression: Option<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hide: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_group: Option<Vec<FormlyFieldConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_array: Option<Box<FormlyFieldConfig>>,
}

/// Presentation and validation properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormlyProps {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub readonly: bool,
    /// HTML input type for `input` controls.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub multiple: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Engine-native validation messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormlyValidation {
    pub messages: BTreeMap<String, String>,
}

/// Map an abstract field type to the engine's control type.
pub fn control_type(field_type: &FieldType) -> &'static str {
    match field_type {
        FieldType::Text
        | FieldType::Email
        | FieldType::Password
        | FieldType::Number
        | FieldType::Date
        | FieldType::Datetime
        | FieldType::Time => "input",
        FieldType::Textarea => "textarea",
        FieldType::Select | FieldType::Multiselect => "select",
        FieldType::Checkbox | FieldType::Toggle => "checkbox",
        FieldType::Radio => "radio",
        _ => "input",
    }
}

/// HTML input type carried in `props.type` for `input` controls.
fn input_type(field_type: &FieldType) -> Option<&'static str> {
    match field_type {
        FieldType::Text => Some("text"),
        FieldType::Email => Some("email"),
        FieldType::Password => Some("password"),
        FieldType::Number => Some("number"),
        FieldType::Date => Some("date"),
        FieldType::Datetime => Some("datetime-local"),
        FieldType::Time => Some("time"),
        FieldType::File => Some("file"),
        _ => None,
    }
}

/// Project one field.
pub fn to_field(field: &FormFieldDefinition, force_readonly: bool) -> FormlyFieldConfig {
    let readonly = force_readonly || field.readonly;
    let field_type = if readonly {
        READONLY_TYPE
    } else {
        control_type(&field.field_type)
    };

    let validation = field.validation.clone().unwrap_or_default();
    let props = FormlyProps {
        label: display_label(field),
        placeholder: field.placeholder.clone(),
        description: field.description.clone(),
        required: field.required,
        readonly,
        input_type: if readonly {
            None
        } else {
            input_type(&field.field_type).map(str::to_string)
        },
        multiple: field.field_type == FieldType::Multiselect,
        options: field.options.clone(),
        min_length: validation.min_length,
        max_length: validation.max_length,
        pattern: validation.pattern,
        min: validation.min,
        max: validation.max,
    };

    FormlyFieldConfig {
        key: field.key.clone(),
        field_type: field_type.to_string(),
        props,
        default_value: field.default_value.clone(),
        validation: (!validation.messages.is_empty()).then(|| FormlyValidation {
            messages: validation.messages,
        }),
        expressions: field.expressions.clone(),
        hide_expression: field.hide_expression.clone(),
        hide: field.field_type == FieldType::Hidden,
        field_group: field
            .field_group
            .as_ref()
            .map(|children| children.iter().map(|c| to_field(c, force_readonly)).collect()),
        field_array: field
            .field_array
            .as_ref()
            .map(|item| Box::new(to_field(item, force_readonly))),
    }
}

/// Project a whole definition.
pub fn to_field_config(definition: &FormDefinition, force_readonly: bool) -> Vec<FormlyFieldConfig> {
    definition
        .fields
        .iter()
        .map(|field| to_field(field, force_readonly))
        .collect()
}

/// Adapter for the Formly-style engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormlyAdapter;

impl FormEngineAdapter for FormlyAdapter {
    fn engine(&self) -> FormEngine {
        FormEngine::Formly
    }

    fn render(&self, definition: &FormDefinition, force_readonly: bool) -> Value {
        serde_json::to_value(to_field_config(definition, force_readonly))
            .unwrap_or(Value::Array(Vec::new()))
    }
}
