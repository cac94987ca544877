//! Engine-agnostic form definitions and their engine adapters.
//!
//! A [`FormDefinition`] describes fields, validation, and layout without any
//! engine vocabulary. [`FormEngineAdapter`] implementations project it into a
//! Formly-style field list or a JSON-Forms-style schema pair, and
//! [`FormLoader`] resolves definitions from YAML/JSON documents.

pub mod definition;
pub mod engine;
pub mod formly;
pub mod jsonforms;
pub mod loader;
pub mod model;

pub use definition::{
    FieldOption, FieldType, FieldValidation, FormDefinition, FormFieldDefinition, FormLayout,
    FormMode, FormSection,
};
pub use engine::{FormEngine, FormEngineAdapter};
pub use formly::{FormlyAdapter, FormlyFieldConfig, to_field_config};
pub use jsonforms::{JsonFormsAdapter, JsonFormsOutput, to_schema};
pub use loader::{FormLoader, adapt_edit_to_add, document_name};
pub use model::create_default_model;
