//! Default form models.

use super::definition::FormDefinition;
use serde_json::{Map, Value};

/// Seed a model from field defaults. Fields without a default are left out
/// rather than filled with a zero value.
pub fn create_default_model(definition: &FormDefinition) -> Map<String, Value> {
    definition
        .fields
        .iter()
        .filter_map(|field| {
            field
                .default_value
                .as_ref()
                .map(|value| (field.key.clone(), value.clone()))
        })
        .collect()
}
