//! Catalog of view renderers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the user is doing with an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererAction {
    Browse,
    Read,
    Edit,
    Add,
}

impl RendererAction {
    pub const ALL: [RendererAction; 4] = [
        RendererAction::Browse,
        RendererAction::Read,
        RendererAction::Edit,
        RendererAction::Add,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RendererAction::Browse => "browse",
            RendererAction::Read => "read",
            RendererAction::Edit => "edit",
            RendererAction::Add => "add",
        }
    }
}

impl fmt::Display for RendererAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RendererAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "browse" => Ok(RendererAction::Browse),
            "read" => Ok(RendererAction::Read),
            "edit" => Ok(RendererAction::Edit),
            "add" => Ok(RendererAction::Add),
            other => Err(format!("unknown action '{}'", other)),
        }
    }
}

/// A registered strategy for presenting entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRendererDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub supported_actions: Vec<RendererAction>,
    #[serde(rename = "type")]
    pub renderer_type: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_available() -> bool {
    true
}

impl ViewRendererDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        renderer_type: impl Into<String>,
        supported_actions: Vec<RendererAction>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: String::new(),
            supported_actions,
            renderer_type: renderer_type.into(),
            is_default: false,
            available: true,
            description: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn supports(&self, action: RendererAction) -> bool {
        self.supported_actions.contains(&action)
    }

    /// Available and supports `action`.
    pub fn usable_for(&self, action: RendererAction) -> bool {
        self.available && self.supports(action)
    }
}

/// The built-in renderers, in declaration order.
pub fn default_renderers() -> Vec<ViewRendererDefinition> {
    use RendererAction::*;

    vec![
        ViewRendererDefinition::new("browse-cards", "Cards", "cards", vec![Browse])
            .with_icon("view_module")
            .with_description("Card grid with summary fields")
            .as_default(),
        ViewRendererDefinition::new("browse-table", "Table", "table", vec![Browse])
            .with_icon("table_chart")
            .with_description("Sortable data table"),
        ViewRendererDefinition::new("browse-list", "List", "list", vec![Browse])
            .with_icon("view_list")
            .with_description("Compact list"),
        ViewRendererDefinition::new("read-labels", "Labels", "labels", vec![Read])
            .with_icon("label")
            .with_description("Label/value pairs")
            .as_default(),
        ViewRendererDefinition::new("read-custom", "Custom", "custom", vec![Read])
            .with_icon("dashboard_customize")
            .with_description("Hand-built detail view"),
        ViewRendererDefinition::new("read-card", "Card", "card", vec![Read])
            .with_icon("article")
            .with_description("Single detail card"),
        ViewRendererDefinition::new("edit-dynamic-form", "Dynamic form", "dynamic-form", vec![Edit, Add])
            .with_icon("dynamic_form")
            .with_description("Field-config driven form")
            .as_default(),
        ViewRendererDefinition::new("edit-custom", "Custom form", "custom", vec![Edit, Add])
            .with_icon("edit_note")
            .with_description("Hand-built form"),
        ViewRendererDefinition::new("edit-json-forms", "JSON schema form", "json-schema-form", vec![Edit, Add])
            .with_icon("data_object")
            .with_description("Schema and UI-schema driven form"),
    ]
}

/// Renderers keyed by id, in registration order.
#[derive(Debug, Clone, Default)]
pub struct RendererRegistry {
    renderers: Vec<ViewRendererDefinition>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with [`default_renderers`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for renderer in default_renderers() {
            registry.register(renderer);
        }
        registry
    }

    /// Register a renderer. An existing id is replaced in place, keeping its
    /// position; nothing from the old definition survives.
    pub fn register(&mut self, renderer: ViewRendererDefinition) {
        match self.renderers.iter_mut().find(|r| r.id == renderer.id) {
            Some(existing) => *existing = renderer,
            None => self.renderers.push(renderer),
        }
    }

    pub fn get(&self, id: &str) -> Option<&ViewRendererDefinition> {
        self.renderers.iter().find(|r| r.id == id)
    }

    pub fn all(&self) -> &[ViewRendererDefinition] {
        &self.renderers
    }

    /// Available renderers supporting `action`, in declaration order.
    pub fn for_action(&self, action: RendererAction) -> impl Iterator<Item = &ViewRendererDefinition> {
        self.renderers.iter().filter(move |r| r.usable_for(action))
    }

    /// The renderer marked default for `action`, or else the first usable one.
    pub fn default_for(&self, action: RendererAction) -> Option<&ViewRendererDefinition> {
        self.for_action(action)
            .find(|r| r.is_default)
            .or_else(|| self.for_action(action).next())
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_per_action() {
        let registry = RendererRegistry::with_defaults();
        assert_eq!(registry.default_for(RendererAction::Browse).unwrap().id, "browse-cards");
        assert_eq!(registry.default_for(RendererAction::Read).unwrap().id, "read-labels");
        assert_eq!(registry.default_for(RendererAction::Edit).unwrap().id, "edit-dynamic-form");
        assert_eq!(registry.default_for(RendererAction::Add).unwrap().id, "edit-dynamic-form");
        assert_eq!(registry.for_action(RendererAction::Browse).count(), 3);
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = RendererRegistry::with_defaults();
        let before = registry.len();
        registry.register(
            ViewRendererDefinition::new("browse-table", "Grid", "grid", vec![RendererAction::Browse])
                .as_default(),
        );
        assert_eq!(registry.len(), before);
        assert_eq!(registry.all()[1].id, "browse-table");
        assert_eq!(registry.all()[1].name, "Grid");
        assert!(registry.all()[1].icon.is_empty());
    }

    #[test]
    fn test_default_skips_unavailable() {
        let mut registry = RendererRegistry::new();
        registry.register(
            ViewRendererDefinition::new("a", "A", "cards", vec![RendererAction::Browse])
                .as_default()
                .unavailable(),
        );
        registry.register(ViewRendererDefinition::new("b", "B", "table", vec![RendererAction::Browse]));
        registry.register(ViewRendererDefinition::new("c", "C", "list", vec![RendererAction::Browse]));
        assert_eq!(registry.default_for(RendererAction::Browse).unwrap().id, "b");
        assert!(registry.default_for(RendererAction::Read).is_none());
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("Browse".parse::<RendererAction>().unwrap(), RendererAction::Browse);
        assert!("delete".parse::<RendererAction>().is_err());
    }
}
