//! View renderer selection.
//!
//! A renderer is resolved for an `(entity_type, action)` pair in priority
//! order: the entity's own preference, then the global `*` preference, then
//! the registry default for the action, then the first available renderer
//! supporting it. Preferences that name a renderer which is no longer
//! registered, available, or able to handle the action are skipped.

pub mod preferences;
pub mod registry;

pub use preferences::{
    FilePreferenceStore, GLOBAL_ENTITY, MemoryPreferenceStore, PREFERENCES_KEY, PreferenceStore,
    ViewPreference,
};
pub use registry::{RendererAction, RendererRegistry, ViewRendererDefinition, default_renderers};

use crate::error::RendererError;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Registry plus persisted preferences.
pub struct RendererService {
    registry: RwLock<RendererRegistry>,
    preferences: RwLock<Vec<ViewPreference>>,
    store: Arc<dyn PreferenceStore>,
}

impl RendererService {
    /// Build a service over `registry`, loading stored preferences once.
    pub async fn open(registry: RendererRegistry, store: Arc<dyn PreferenceStore>) -> Self {
        let preferences = store.load().await;
        debug!(count = preferences.len(), "Loaded view preferences");
        Self {
            registry: RwLock::new(registry),
            preferences: RwLock::new(preferences),
            store,
        }
    }

    /// Resolve the renderer to use for `entity_type` and `action`.
    pub async fn resolve(
        &self,
        entity_type: &str,
        action: RendererAction,
    ) -> Option<ViewRendererDefinition> {
        let registry = self.registry.read().await;
        let preferences = self.preferences.read().await;

        let preferred = |entity: &str| {
            preferences
                .iter()
                .find(|p| p.matches(entity, action))
                .and_then(|p| registry.get(&p.renderer_id))
                .filter(|r| r.usable_for(action))
        };

        preferred(entity_type)
            .or_else(|| preferred(GLOBAL_ENTITY))
            .or_else(|| registry.default_for(action))
            .cloned()
    }

    /// Record `renderer_id` as the choice for the pair, replacing any earlier
    /// choice, and persist the list.
    pub async fn set_preference(
        &self,
        entity_type: &str,
        action: RendererAction,
        renderer_id: &str,
    ) -> Result<ViewPreference, RendererError> {
        {
            let registry = self.registry.read().await;
            let renderer = registry
                .get(renderer_id)
                .ok_or_else(|| RendererError::UnknownRenderer(renderer_id.to_string()))?;
            if !renderer.supports(action) {
                return Err(RendererError::UnsupportedAction {
                    renderer_id: renderer_id.to_string(),
                    action: action.to_string(),
                });
            }
        }

        let preference = ViewPreference::new(entity_type, action, renderer_id);
        let mut preferences = self.preferences.write().await;
        let mut updated: Vec<ViewPreference> = preferences
            .iter()
            .filter(|p| !p.matches(entity_type, action))
            .cloned()
            .collect();
        updated.push(preference.clone());
        self.store.save(&updated).await?;
        *preferences = updated;

        info!(entity = %entity_type, action = %action, renderer = %renderer_id, "Set view preference");
        Ok(preference)
    }

    /// Remove the preference for the pair. Returns whether one existed.
    pub async fn clear_preference(
        &self,
        entity_type: &str,
        action: RendererAction,
    ) -> Result<bool, RendererError> {
        let mut preferences = self.preferences.write().await;
        let updated: Vec<ViewPreference> = preferences
            .iter()
            .filter(|p| !p.matches(entity_type, action))
            .cloned()
            .collect();
        if updated.len() == preferences.len() {
            return Ok(false);
        }
        // The cached list only changes once the store accepted it.
        self.store.save(&updated).await?;
        *preferences = updated;
        info!(entity = %entity_type, action = %action, "Cleared view preference");
        Ok(true)
    }

    pub async fn preferences(&self) -> Vec<ViewPreference> {
        self.preferences.read().await.clone()
    }

    /// Add or replace a renderer definition.
    pub async fn register(&self, renderer: ViewRendererDefinition) {
        debug!(renderer = %renderer.id, "Registering renderer");
        self.registry.write().await.register(renderer);
    }

    /// Available renderers for `action`, or every registered renderer.
    pub async fn renderers_for(&self, action: Option<RendererAction>) -> Vec<ViewRendererDefinition> {
        let registry = self.registry.read().await;
        match action {
            Some(action) => registry.for_action(action).cloned().collect(),
            None => registry.all().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use std::path::PathBuf;

    /// Store that holds a fixed list and refuses every write.
    struct ReadOnlyStore(Vec<ViewPreference>);

    #[async_trait]
    impl PreferenceStore for ReadOnlyStore {
        async fn load(&self) -> Vec<ViewPreference> {
            self.0.clone()
        }

        async fn save(&self, _preferences: &[ViewPreference]) -> Result<(), RendererError> {
            Err(RendererError::Storage {
                path: PathBuf::from("read-only"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    async fn service() -> RendererService {
        RendererService::open(
            RendererRegistry::with_defaults(),
            Arc::new(MemoryPreferenceStore::new()),
        )
        .await
    }

    #[tokio::test]
    async fn test_resolution_priority() {
        let service = service().await;
        let browse = RendererAction::Browse;

        assert_eq!(service.resolve("spike", browse).await.unwrap().id, "browse-cards");

        service.set_preference("spike", browse, "browse-table").await.unwrap();
        assert_eq!(service.resolve("spike", browse).await.unwrap().id, "browse-table");

        service.set_preference(GLOBAL_ENTITY, browse, "browse-list").await.unwrap();
        assert_eq!(service.resolve("organization", browse).await.unwrap().id, "browse-list");
        assert_eq!(service.resolve("spike", browse).await.unwrap().id, "browse-table");
    }

    #[tokio::test]
    async fn test_one_preference_per_pair() {
        let service = service().await;
        service.set_preference("spike", RendererAction::Read, "read-card").await.unwrap();
        service.set_preference("spike", RendererAction::Read, "read-custom").await.unwrap();
        service.set_preference("spike", RendererAction::Edit, "edit-custom").await.unwrap();

        let prefs = service.preferences().await;
        assert_eq!(prefs.len(), 2);
        assert_eq!(service.resolve("spike", RendererAction::Read).await.unwrap().id, "read-custom");
    }

    #[tokio::test]
    async fn test_set_rejects_unknown_or_unsupported() {
        let service = service().await;
        let err = service
            .set_preference("spike", RendererAction::Browse, "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, RendererError::UnknownRenderer(_)));

        let err = service
            .set_preference("spike", RendererAction::Browse, "read-card")
            .await
            .unwrap_err();
        assert!(matches!(err, RendererError::UnsupportedAction { .. }));
        assert!(service.preferences().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_falls_back_to_default() {
        let service = service().await;
        service.set_preference("spike", RendererAction::Add, "edit-json-forms").await.unwrap();
        assert!(service.clear_preference("spike", RendererAction::Add).await.unwrap());
        assert!(!service.clear_preference("spike", RendererAction::Add).await.unwrap());
        assert_eq!(
            service.resolve("spike", RendererAction::Add).await.unwrap().id,
            "edit-dynamic-form"
        );
    }

    #[tokio::test]
    async fn test_unavailable_preference_is_skipped() {
        let service = service().await;
        service.set_preference("spike", RendererAction::Browse, "browse-list").await.unwrap();
        service
            .register(
                ViewRendererDefinition::new("browse-list", "List", "list", vec![RendererAction::Browse])
                    .unavailable(),
            )
            .await;
        assert_eq!(
            service.resolve("spike", RendererAction::Browse).await.unwrap().id,
            "browse-cards"
        );
        assert_eq!(service.renderers_for(Some(RendererAction::Browse)).await.len(), 2);
    }

    #[tokio::test]
    async fn test_preferences_loaded_from_store() {
        let store = MemoryPreferenceStore::with_preferences(vec![ViewPreference::new(
            "spike",
            RendererAction::Browse,
            "browse-table",
        )]);
        let service = RendererService::open(RendererRegistry::with_defaults(), Arc::new(store)).await;
        assert_eq!(
            service.resolve("spike", RendererAction::Browse).await.unwrap().id,
            "browse-table"
        );
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_choice() {
        let store = ReadOnlyStore(vec![ViewPreference::new(
            "spike",
            RendererAction::Browse,
            "browse-list",
        )]);
        let service = RendererService::open(RendererRegistry::with_defaults(), Arc::new(store)).await;

        let err = service
            .set_preference("spike", RendererAction::Browse, "browse-table")
            .await
            .unwrap_err();
        assert!(matches!(err, RendererError::Storage { .. }));
        assert_eq!(
            service.resolve("spike", RendererAction::Browse).await.unwrap().id,
            "browse-list"
        );

        assert!(service.clear_preference("spike", RendererAction::Browse).await.is_err());
        let prefs = service.preferences().await;
        assert_eq!(prefs.len(), 1);
        assert_eq!(prefs[0].renderer_id, "browse-list");
    }
}
