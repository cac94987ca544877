//! JSON-Forms-style schema and UI schema.
//!
//! The data schema is a JSON-Schema object with one property per field. The
//! UI schema is a `VerticalLayout` of `Control`s, grouped by layout section
//! when the definition has sections.

use super::definition::{FieldType, FormDefinition, FormFieldDefinition};
use super::engine::{FormEngine, FormEngineAdapter, display_label};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::HashSet;

/// Data schema plus UI schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonFormsOutput {
    pub schema: Value,
    pub uischema: Value,
}

/// JSON-Schema type for a field type.
pub fn schema_type(field_type: &FieldType) -> &'static str {
    match field_type {
        FieldType::Number => "number",
        FieldType::Checkbox | FieldType::Toggle => "boolean",
        FieldType::Array => "array",
        FieldType::Object => "object",
        _ => "string",
    }
}

fn schema_format(field_type: &FieldType) -> Option<&'static str> {
    match field_type {
        FieldType::Email => Some("email"),
        FieldType::Date => Some("date"),
        FieldType::Datetime => Some("date-time"),
        FieldType::Time => Some("time"),
        _ => None,
    }
}

/// Schema for one field, recursing into object and array fields.
pub fn field_schema(field: &FormFieldDefinition, force_readonly: bool) -> Value {
    let mut property = Map::new();
    property.insert("type".into(), json!(schema_type(&field.field_type)));
    property.insert("title".into(), json!(display_label(field)));

    if let Some(description) = &field.description {
        property.insert("description".into(), json!(description));
    }
    if let Some(default) = &field.default_value {
        property.insert("default".into(), default.clone());
    }
    if let Some(format) = schema_format(&field.field_type) {
        property.insert("format".into(), json!(format));
    }
    if force_readonly || field.readonly {
        property.insert("readOnly".into(), json!(true));
    }

    if matches!(
        field.field_type,
        FieldType::Select | FieldType::Multiselect | FieldType::Radio
    ) && !field.options.is_empty()
    {
        let values: Vec<Value> = field.options.iter().map(|o| o.value.clone()).collect();
        property.insert("enum".into(), Value::Array(values));
    }

    if let Some(validation) = &field.validation {
        if let Some(min_length) = validation.min_length {
            property.insert("minLength".into(), json!(min_length));
        }
        if let Some(max_length) = validation.max_length {
            property.insert("maxLength".into(), json!(max_length));
        }
        if let Some(pattern) = &validation.pattern {
            property.insert("pattern".into(), json!(pattern));
        }
        if let Some(min) = validation.min {
            property.insert("minimum".into(), json!(min));
        }
        if let Some(max) = validation.max {
            property.insert("maximum".into(), json!(max));
        }
    }

    match field.field_type {
        FieldType::Object => {
            let children = field.field_group.as_deref().unwrap_or_default();
            let (properties, required) = properties_for(children, force_readonly);
            property.insert("properties".into(), Value::Object(properties));
            if !required.is_empty() {
                property.insert("required".into(), json!(required));
            }
        }
        FieldType::Array => {
            let items = field
                .field_array
                .as_deref()
                .map(|item| field_schema(item, force_readonly))
                .unwrap_or_else(|| json!({"type": "string"}));
            property.insert("items".into(), items);
        }
        _ => {}
    }

    Value::Object(property)
}

fn properties_for(fields: &[FormFieldDefinition], force_readonly: bool) -> (Map<String, Value>, Vec<String>) {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in fields {
        properties.insert(field.key.clone(), field_schema(field, force_readonly));
        if field.required {
            required.push(field.key.clone());
        }
    }
    (properties, required)
}

fn control(field: &FormFieldDefinition) -> Value {
    json!({
        "type": "Control",
        "scope": format!("#/properties/{}", field.key),
        "label": display_label(field),
    })
}

/// Build the UI schema. With sections, each becomes a `Group`; fields no
/// section mentions follow the groups as plain controls.
pub fn ui_schema(definition: &FormDefinition) -> Value {
    let sections = definition
        .layout
        .as_ref()
        .map(|layout| layout.sections.as_slice())
        .unwrap_or_default();

    let elements: Vec<Value> = if sections.is_empty() {
        definition.fields.iter().map(control).collect()
    } else {
        let mut placed = HashSet::new();
        let mut elements = Vec::new();
        for section in sections {
            let controls: Vec<Value> = section
                .field_keys
                .iter()
                .filter_map(|key| definition.field(key))
                .inspect(|field| {
                    placed.insert(field.key.as_str());
                })
                .map(control)
                .collect();
            elements.push(json!({
                "type": "Group",
                "label": section.title,
                "elements": controls,
            }));
        }
        elements.extend(
            definition
                .fields
                .iter()
                .filter(|field| !placed.contains(field.key.as_str()))
                .map(control),
        );
        elements
    };

    json!({
        "type": "VerticalLayout",
        "elements": elements,
    })
}

/// Project a definition into schema and UI schema.
pub fn to_schema(definition: &FormDefinition, force_readonly: bool) -> JsonFormsOutput {
    let (properties, required) = properties_for(&definition.fields, force_readonly);
    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    if let Some(title) = &definition.title {
        schema.insert("title".into(), json!(title));
    }
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), json!(required));
    }

    JsonFormsOutput {
        schema: Value::Object(schema),
        uischema: ui_schema(definition),
    }
}

/// Adapter for the JSON-Forms-style engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormsAdapter;

impl FormEngineAdapter for JsonFormsAdapter {
    fn engine(&self) -> FormEngine {
        FormEngine::JsonForms
    }

    fn render(&self, definition: &FormDefinition, force_readonly: bool) -> Value {
        serde_json::to_value(to_schema(definition, force_readonly)).unwrap_or(Value::Null)
    }
}
