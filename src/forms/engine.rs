//! Form engine selection.

use super::definition::{FormDefinition, FormFieldDefinition};
use super::formly::FormlyAdapter;
use super::jsonforms::JsonFormsAdapter;
use heck::ToTitleCase;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A concrete rendering engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormEngine {
    #[default]
    Formly,
    JsonForms,
}

impl FormEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormEngine::Formly => "formly",
            FormEngine::JsonForms => "json_forms",
        }
    }

    /// The adapter implementing this engine.
    pub fn adapter(&self) -> &'static dyn FormEngineAdapter {
        match self {
            FormEngine::Formly => &FormlyAdapter,
            FormEngine::JsonForms => &JsonFormsAdapter,
        }
    }
}

impl fmt::Display for FormEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "formly" => Ok(FormEngine::Formly),
            "json_forms" | "jsonforms" => Ok(FormEngine::JsonForms),
            other => Err(format!("unknown form engine '{}'", other)),
        }
    }
}

/// Projects a [`FormDefinition`] into one engine's configuration.
///
/// Engine-specific vocabulary lives only in implementations of this trait.
pub trait FormEngineAdapter: Send + Sync {
    fn engine(&self) -> FormEngine;

    /// Render `definition`; `force_readonly` turns every field display-only.
    fn render(&self, definition: &FormDefinition, force_readonly: bool) -> Value;
}

/// Field label, falling back to the title-cased key.
pub(crate) fn display_label(field: &FormFieldDefinition) -> String {
    if field.label.trim().is_empty() {
        field.key.to_title_case()
    } else {
        field.label.clone()
    }
}
