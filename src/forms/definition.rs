//! Engine-agnostic form definitions.

use crate::error::FormError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Mode a form is presented in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    View,
    #[default]
    Edit,
    Add,
}

impl FormMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormMode::View => "view",
            FormMode::Edit => "edit",
            FormMode::Add => "add",
        }
    }
}

impl fmt::Display for FormMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "view" => Ok(FormMode::View),
            "edit" => Ok(FormMode::Edit),
            "add" => Ok(FormMode::Add),
            other => Err(format!("unknown form mode '{}'", other)),
        }
    }
}

/// Field type. Unrecognised names are kept as [`FieldType::Unknown`] so that
/// documents written for newer clients still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Email,
    Password,
    Select,
    Multiselect,
    Checkbox,
    Toggle,
    Radio,
    Date,
    Datetime,
    Time,
    Hidden,
    File,
    Array,
    Object,
    Custom,
    Unknown(String),
}

impl FieldType {
    /// Every type in the closed set.
    pub const KNOWN: [FieldType; 18] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Number,
        FieldType::Email,
        FieldType::Password,
        FieldType::Select,
        FieldType::Multiselect,
        FieldType::Checkbox,
        FieldType::Toggle,
        FieldType::Radio,
        FieldType::Date,
        FieldType::Datetime,
        FieldType::Time,
        FieldType::Hidden,
        FieldType::File,
        FieldType::Array,
        FieldType::Object,
        FieldType::Custom,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::Email => "email",
            FieldType::Password => "password",
            FieldType::Select => "select",
            FieldType::Multiselect => "multiselect",
            FieldType::Checkbox => "checkbox",
            FieldType::Toggle => "toggle",
            FieldType::Radio => "radio",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::Time => "time",
            FieldType::Hidden => "hidden",
            FieldType::File => "file",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Custom => "custom",
            FieldType::Unknown(name) => name,
        }
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        FieldType::KNOWN
            .into_iter()
            .find(|known| known.as_str() == value)
            .unwrap_or(FieldType::Unknown(value))
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: Value,
    pub label: String,
}

/// Validation constraints, copied through to every engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Validator name → message.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub messages: BTreeMap<String, String>,
}

/// One field of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldDefinition {
    pub key: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub readonly: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,

    /// Child fields of an `object` field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_group: Option<Vec<FormFieldDefinition>>,

    /// Item template of an `array` field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_array: Option<Box<FormFieldDefinition>>,

    /// Opaque engine directives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expressions: Option<Value>,

    /// Opaque directive; the field is hidden while it evaluates true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_expression: Option<Value>,
}

impl FormFieldDefinition {
    pub fn new(key: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            field_type,
            label: label.into(),
            placeholder: None,
            description: None,
            default_value: None,
            required: false,
            readonly: false,
            validation: None,
            options: Vec::new(),
            field_group: None,
            field_array: None,
            expressions: None,
            hide_expression: None,
        }
    }

    fn validate(&self, form_id: &str) -> Result<(), FormError> {
        if self.key.trim().is_empty() {
            return Err(FormError::invalid_field(form_id, &self.key, "field key must not be empty"));
        }
        if self.field_group.is_some() && self.field_type != FieldType::Object {
            return Err(FormError::invalid_field(
                form_id,
                &self.key,
                format!("fieldGroup is only valid on object fields, not '{}'", self.field_type),
            ));
        }
        if self.field_array.is_some() && self.field_type != FieldType::Array {
            return Err(FormError::invalid_field(
                form_id,
                &self.key,
                format!("fieldArray is only valid on array fields, not '{}'", self.field_type),
            ));
        }
        if let Some(children) = &self.field_group {
            validate_fields(form_id, children)?;
        }
        if let Some(item) = &self.field_array {
            item.validate(form_id)?;
        }
        Ok(())
    }
}

/// Named group of fields in the layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub field_keys: Vec<String>,
}

/// Column count and sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
    #[serde(default)]
    pub sections: Vec<FormSection>,
}

/// A form for one entity and mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub id: String,

    #[serde(default)]
    pub mode: FormMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub fields: Vec<FormFieldDefinition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<FormLayout>,
}

impl FormDefinition {
    /// Build a definition from a parsed document, checking required keys
    /// first so the error names what is missing. `location` identifies the
    /// document in messages.
    pub fn from_value(value: Value, location: &str) -> Result<Self, FormError> {
        let object = value.as_object().ok_or_else(|| FormError::Parse {
            location: location.to_string(),
            message: "form definition must be a mapping".to_string(),
        })?;
        if !object.get("id").is_some_and(|id| id.is_string()) {
            return Err(FormError::missing_field(location, "id"));
        }
        if !object.get("fields").is_some_and(Value::is_array) {
            return Err(FormError::missing_field(location, "fields"));
        }

        let definition: FormDefinition =
            serde_json::from_value(value).map_err(|e| FormError::Parse {
                location: location.to_string(),
                message: e.to_string(),
            })?;
        definition.validate()?;
        Ok(definition)
    }

    /// Check structural invariants: nested groups only on the right field
    /// types, and every layout key naming a real field.
    pub fn validate(&self) -> Result<(), FormError> {
        validate_fields(&self.id, &self.fields)?;

        if let Some(layout) = &self.layout {
            let keys: HashSet<&str> = self.fields.iter().map(|f| f.key.as_str()).collect();
            for section in &layout.sections {
                for key in &section.field_keys {
                    if !keys.contains(key.as_str()) {
                        return Err(FormError::invalid_field(
                            &self.id,
                            key,
                            format!("layout section '{}' references an unknown field", section.title),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn field(&self, key: &str) -> Option<&FormFieldDefinition> {
        self.fields.iter().find(|f| f.key == key)
    }
}

fn validate_fields(form_id: &str, fields: &[FormFieldDefinition]) -> Result<(), FormError> {
    let mut seen = HashSet::new();
    for field in fields {
        field.validate(form_id)?;
        if !seen.insert(field.key.as_str()) {
            return Err(FormError::invalid_field(form_id, &field.key, "duplicate field key"));
        }
    }
    Ok(())
}
