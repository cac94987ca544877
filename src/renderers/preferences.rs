//! Persistence of renderer preferences.
//!
//! Preferences live as one JSON-serialised list under a single key of a
//! key/value storage file, the on-disk counterpart of browser local storage.
//! Missing or corrupt data reads as an empty list.

use super::registry::RendererAction;
use crate::error::RendererError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Storage key holding the serialised preference list.
pub const PREFERENCES_KEY: &str = "view-preferences";

/// Entity type reserved for preferences that apply to every entity.
pub const GLOBAL_ENTITY: &str = "*";

/// The renderer chosen for one entity type and action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewPreference {
    pub entity_type: String,
    pub action: RendererAction,
    pub renderer_id: String,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl ViewPreference {
    pub fn new(entity_type: impl Into<String>, action: RendererAction, renderer_id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            action,
            renderer_id: renderer_id.into(),
            updated_at: Utc::now(),
        }
    }

    pub fn is_global(&self) -> bool {
        self.entity_type == GLOBAL_ENTITY
    }

    pub fn matches(&self, entity_type: &str, action: RendererAction) -> bool {
        self.entity_type == entity_type && self.action == action
    }
}

/// Where preferences are kept.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Load stored preferences; absence or corruption yields an empty list.
    async fn load(&self) -> Vec<ViewPreference>;

    async fn save(&self, preferences: &[ViewPreference]) -> Result<(), RendererError>;
}

/// JSON key/value file store.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every entry of the storage file. Values under other keys may be any
    /// JSON and are written back untouched.
    async fn read_entries(&self) -> Map<String, Value> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read preference storage");
                return Map::new();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "Ignoring corrupt preference storage");
            Map::new()
        })
    }

    fn storage_error(&self, source: std::io::Error) -> RendererError {
        RendererError::Storage {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn load(&self) -> Vec<ViewPreference> {
        let entries = self.read_entries().await;
        let Some(Value::String(raw)) = entries.get(PREFERENCES_KEY) else {
            if entries.contains_key(PREFERENCES_KEY) {
                warn!(path = %self.path.display(), "Ignoring non-string view preferences entry");
            }
            return Vec::new();
        };
        match serde_json::from_str(raw) {
            Ok(preferences) => preferences,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt view preferences");
                Vec::new()
            }
        }
    }

    async fn save(&self, preferences: &[ViewPreference]) -> Result<(), RendererError> {
        let mut entries = self.read_entries().await;
        let serialised = serde_json::to_string(preferences)
            .map_err(|e| self.storage_error(std::io::Error::other(e)))?;
        entries.insert(PREFERENCES_KEY.to_string(), Value::String(serialised));

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.storage_error(e))?;
        }
        let content = serde_json::to_string_pretty(&entries)
            .map_err(|e| self.storage_error(std::io::Error::other(e)))?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| self.storage_error(e))?;

        debug!(path = %self.path.display(), count = preferences.len(), "Saved view preferences");
        Ok(())
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    preferences: Mutex<Vec<ViewPreference>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: Vec<ViewPreference>) -> Self {
        Self {
            preferences: Mutex::new(preferences),
        }
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn load(&self) -> Vec<ViewPreference> {
        self.preferences.lock().await.clone()
    }

    async fn save(&self, preferences: &[ViewPreference]) -> Result<(), RendererError> {
        *self.preferences.lock().await = preferences.to_vec();
        Ok(())
    }
}
