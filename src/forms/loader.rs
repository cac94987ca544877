//! Form definition loading with a fallback chain and a process-lifetime cache.
//!
//! Resolution order for `load(id, mode)`:
//! 1. `{id}.{mode}.form.yml`
//! 2. `{id}.{mode}.form.json`
//! 3. for `add` only: the `edit` form, adapted into an add form
//! 4. [`FormError::NotFound`]

use super::definition::{FormDefinition, FormMode};
use crate::error::{FormError, SourceError};
use crate::source::DocumentSource;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Serialised document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Yaml => "yml",
            DocumentFormat::Json => "json",
        }
    }

    fn parse(&self, content: &str) -> Result<Value, String> {
        match self {
            DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            DocumentFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// Document name for a form in a given format.
pub fn document_name(form_id: &str, mode: FormMode, extension: &str) -> String {
    format!("{}.{}.form.{}", urlencoding::encode(form_id), mode, extension)
}

fn cache_key(form_id: &str, mode: FormMode) -> String {
    format!("{}-{}", form_id, mode)
}

/// Turn an edit form into an add form: new id, `add` mode, "Edit" in the
/// title becomes "Create New" (or the title is just "Create New"), fields kept.
pub fn adapt_edit_to_add(form_id: &str, edit: &FormDefinition) -> FormDefinition {
    let title = match &edit.title {
        Some(title) if title.contains("Edit") => title.replace("Edit", "Create New"),
        _ => "Create New".to_string(),
    };
    FormDefinition {
        id: format!("{}-add", form_id),
        mode: FormMode::Add,
        title: Some(title),
        ..edit.clone()
    }
}

/// Loads form definitions from a [`DocumentSource`].
pub struct FormLoader {
    source: Arc<dyn DocumentSource>,
    cache: RwLock<HashMap<String, Arc<FormDefinition>>>,
}

impl FormLoader {
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve the form for `form_id` in `mode`.
    pub async fn load(&self, form_id: &str, mode: FormMode) -> Result<Arc<FormDefinition>, FormError> {
        if let Some(found) = self.load_exact(form_id, mode).await? {
            return Ok(found);
        }

        if mode == FormMode::Add
            && let Some(edit) = self.load_exact(form_id, FormMode::Edit).await?
        {
            info!(form_id = %form_id, "No add form, adapting edit form");
            let adapted = Arc::new(adapt_edit_to_add(form_id, &edit));
            self.cache
                .write()
                .await
                .insert(cache_key(form_id, mode), Arc::clone(&adapted));
            return Ok(adapted);
        }

        Err(FormError::NotFound {
            form_id: form_id.to_string(),
            mode: mode.to_string(),
        })
    }

    /// Cached lookup, then YAML, then JSON. `Ok(None)` when neither document
    /// could be used.
    async fn load_exact(
        &self,
        form_id: &str,
        mode: FormMode,
    ) -> Result<Option<Arc<FormDefinition>>, FormError> {
        let key = cache_key(form_id, mode);
        if let Some(cached) = self.cache.read().await.get(&key) {
            debug!(key = %key, "Form cache hit");
            return Ok(Some(Arc::clone(cached)));
        }

        for format in [DocumentFormat::Yaml, DocumentFormat::Json] {
            let Some(definition) = self.load_document(form_id, mode, format).await? else {
                continue;
            };
            let definition = Arc::new(definition);
            self.cache.write().await.insert(key, Arc::clone(&definition));
            return Ok(Some(definition));
        }
        Ok(None)
    }

    /// Fetch and parse one document. Fetch and parse failures move on to the
    /// next stage; a document that parses but breaks the form invariants is
    /// an error.
    async fn load_document(
        &self,
        form_id: &str,
        mode: FormMode,
        format: DocumentFormat,
    ) -> Result<Option<FormDefinition>, FormError> {
        let name = document_name(form_id, mode, format.extension());
        let location = self.source.describe(&name);

        let content = match self.source.fetch(&name).await {
            Ok(content) => content,
            Err(SourceError::NotFound { .. }) => {
                debug!(location = %location, "Form document not found");
                return Ok(None);
            }
            Err(err) => {
                warn!(location = %location, error = %err, "Failed to fetch form document");
                return Ok(None);
            }
        };

        let mut value = match format.parse(&content) {
            Ok(value) => value,
            Err(message) => {
                warn!(location = %location, error = %message, "Failed to parse form document");
                return Ok(None);
            }
        };

        // Documents may leave the mode implicit in their file name.
        if let Some(object) = value.as_object_mut() {
            object
                .entry("mode")
                .or_insert_with(|| Value::String(mode.to_string()));
        }

        FormDefinition::from_value(value, &location).map(Some)
    }

    /// Drop every cached definition.
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    /// Number of cached definitions.
    pub async fn cached(&self) -> usize {
        self.cache.read().await.len()
    }
}
