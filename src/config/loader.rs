//! Settings loader with tier-based merging.
//!
//! Loads settings from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::Settings;
use crate::forms::FormEngine;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name looked up in each settings directory.
pub const SETTINGS_FILE: &str = "settings.yaml";

/// Status workflow picked up from the project directory when
/// `workflow.path` is not set.
pub const STATUSES_FILE: &str = "statuses.yaml";

/// Settings tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SettingsTier {
    /// Embedded defaults (lowest priority)
    Defaults = 0,
    /// Project-level settings ($CWD/tierkit/)
    Project = 1,
    /// User-level settings (~/.tierkit/)
    User = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for SettingsTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsTier::Defaults => write!(f, "defaults"),
            SettingsTier::Project => write!(f, "project"),
            SettingsTier::User => write!(f, "user"),
            SettingsTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories for each settings tier.
#[derive(Debug, Clone)]
pub struct SettingsPaths {
    /// Project-level settings directory
    pub project_dir: Option<PathBuf>,
    /// User-level settings directory
    pub user_dir: Option<PathBuf>,
}

impl Default for SettingsPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl SettingsPaths {
    /// Discover settings paths from environment and defaults.
    pub fn discover() -> Self {
        // User dir: TIERKIT_USER_DIR or ~/.tierkit
        let user_dir = std::env::var("TIERKIT_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".tierkit")));

        // Project dir: TIERKIT_PROJECT_DIR or $CWD/tierkit
        let project_dir = std::env::var("TIERKIT_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("tierkit")));

        Self {
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }
}

/// Settings loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    /// Paths for each tier
    pub paths: SettingsPaths,
    settings: Settings,
    /// Files that contributed, lowest tier first
    sources: Vec<(SettingsTier, PathBuf)>,
}

impl SettingsLoader {
    /// Load settings from all tiers with proper merging.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(SettingsPaths::discover())
    }

    /// Load settings with explicit paths.
    pub fn load_with_paths(paths: SettingsPaths) -> Result<Self> {
        // Explicit settings file overrides every tier
        if let Ok(explicit_path) = std::env::var("TIERKIT_SETTINGS_PATH") {
            return Self::load_explicit(paths, PathBuf::from(explicit_path));
        }

        let mut layers: Vec<Value> = Vec::new();
        let mut sources = Vec::new();

        // Tier 1: Defaults (embedded)
        let defaults = serde_json::to_value(Settings::default())
            .context("failed to serialise default settings")?;
        layers.push(defaults);

        // Tier 2: Project settings
        if let Some(ref project_dir) = paths.project_dir
            && let Some(layer) = read_layer(&project_dir.join(SETTINGS_FILE))
        {
            layers.push(layer);
            sources.push((SettingsTier::Project, project_dir.join(SETTINGS_FILE)));
        }

        // Tier 3: User settings
        if let Some(ref user_dir) = paths.user_dir
            && let Some(layer) = read_layer(&user_dir.join(SETTINGS_FILE))
        {
            layers.push(layer);
            sources.push((SettingsTier::User, user_dir.join(SETTINGS_FILE)));
        }

        let merged = deep_merge_all(layers);
        let mut settings: Settings =
            serde_json::from_value(merged).context("invalid merged settings")?;

        // Tier 4: Environment variable overrides
        Self::apply_env_overrides(&mut settings);
        Self::discover_workflow(&mut settings, &paths);

        debug!(sources = sources.len(), "Loaded settings");

        Ok(Self {
            paths,
            settings,
            sources,
        })
    }

    /// Load from an explicit file, still honoring environment overrides.
    pub fn load_explicit(paths: SettingsPaths, path: PathBuf) -> Result<Self> {
        let mut settings = Settings::load(&path)?;
        Self::apply_env_overrides(&mut settings);
        Self::discover_workflow(&mut settings, &paths);
        Ok(Self {
            paths,
            settings,
            sources: vec![(SettingsTier::User, path)],
        })
    }

    /// Apply environment variable overrides to settings.
    fn apply_env_overrides(settings: &mut Settings) {
        if let Ok(base) = std::env::var("TIERKIT_FORMS_BASE") {
            settings.forms.base = base;
        }

        if let Ok(engine) = std::env::var("TIERKIT_FORM_ENGINE") {
            match engine.parse::<FormEngine>() {
                Ok(engine) => settings.forms.engine = engine,
                Err(_) => warn!(value = %engine, "Ignoring unknown TIERKIT_FORM_ENGINE"),
            }
        }

        if let Ok(url) = std::env::var("TIERKIT_OVERLAY_URL") {
            settings.overlay.url = url;
        }

        if let Ok(path) = std::env::var("TIERKIT_PREFERENCES_PATH") {
            settings.preferences.path = PathBuf::from(path);
        }

        if let Ok(api_url) = std::env::var("TIERKIT_API_URL") {
            settings.environment.api_url = api_url;
        }
    }

    /// Fall back to `statuses.yaml` in the project directory when no
    /// workflow file is configured.
    fn discover_workflow(settings: &mut Settings, paths: &SettingsPaths) {
        if settings.workflow.path.is_some() {
            return;
        }
        if let Some(ref project_dir) = paths.project_dir {
            let candidate = project_dir.join(STATUSES_FILE);
            if candidate.is_file() {
                debug!(path = %candidate.display(), "Using project status workflow");
                settings.workflow.path = Some(candidate);
            }
        }
    }

    /// Get the loaded settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get mutable access to the settings.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Consume the loader and return the settings.
    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Files that contributed to the merged settings, lowest tier first.
    pub fn sources(&self) -> &[(SettingsTier, PathBuf)] {
        &self.sources
    }

    pub fn project_dir(&self) -> Option<&Path> {
        self.paths.project_dir.as_deref()
    }

    pub fn user_dir(&self) -> Option<&Path> {
        self.paths.user_dir.as_deref()
    }
}

/// Read one YAML settings layer. Missing files are skipped silently; broken
/// ones are skipped with a warning so a typo never blocks startup.
fn read_layer(path: &Path) -> Option<Value> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read settings layer");
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to parse settings layer");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_paths_discover() {
        let paths = SettingsPaths::discover();
        assert!(paths.project_dir.is_some());
    }

    #[test]
    fn test_load_defaults_only() {
        let temp = TempDir::new().unwrap();
        let paths = SettingsPaths::with_dirs(
            Some(temp.path().join("project")),
            Some(temp.path().join("user")),
        );

        let loader = SettingsLoader::load_with_paths(paths).unwrap();
        assert_eq!(loader.settings().forms.base, "forms");
        assert!(loader.sources().is_empty());
    }

    #[test]
    fn test_user_settings_override_project() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("tierkit");
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::create_dir_all(&user_dir).unwrap();

        std::fs::write(
            project_dir.join(SETTINGS_FILE),
            "forms:\n  base: project-forms\n  engine: json_forms\n",
        )
        .unwrap();
        std::fs::write(user_dir.join(SETTINGS_FILE), "forms:\n  base: user-forms\n").unwrap();

        let paths = SettingsPaths::with_dirs(Some(project_dir), Some(user_dir));
        let loader = SettingsLoader::load_with_paths(paths).unwrap();

        assert_eq!(loader.settings().forms.base, "user-forms");
        assert_eq!(loader.settings().forms.engine, FormEngine::JsonForms);
        assert_eq!(loader.sources().len(), 2);
        assert_eq!(loader.sources()[1].0, SettingsTier::User);
    }

    #[test]
    fn test_broken_layer_is_skipped() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("tierkit");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join(SETTINGS_FILE), "forms: [unclosed").unwrap();

        let paths = SettingsPaths::with_dirs(Some(project_dir), None);
        let loader = SettingsLoader::load_with_paths(paths).unwrap();
        assert_eq!(loader.settings().forms.base, "forms");
    }
}
