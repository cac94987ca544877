//! Settings types for the tool itself.
//!
//! These describe where documents live and which engine renders forms; the
//! tiered application configuration is built separately in [`super::tiers`].

use super::overlay::DEFAULT_OVERLAY_URL;
use super::tiers::Environment;
use crate::forms::FormEngine;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub forms: FormsSettings,

    #[serde(default)]
    pub overlay: OverlaySettings,

    #[serde(default)]
    pub preferences: PreferenceSettings,

    #[serde(default)]
    pub tiers: TierSettings,

    #[serde(default)]
    pub workflow: WorkflowSettings,
}

/// Where form documents come from and how they are rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormsSettings {
    /// Directory or `http(s)://` base holding `{id}.{mode}.form.yml|json`.
    #[serde(default = "default_forms_base")]
    pub base: String,

    /// Engine used when a command does not name one.
    #[serde(default)]
    pub engine: FormEngine,
}

impl Default for FormsSettings {
    fn default() -> Self {
        Self {
            base: default_forms_base(),
            engine: FormEngine::default(),
        }
    }
}

fn default_forms_base() -> String {
    "forms".to_string()
}

/// Overlay document applied at bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlaySettings {
    /// Directory or `http(s)://` base the overlay is fetched from.
    #[serde(default = "default_overlay_base")]
    pub base: String,

    #[serde(default = "default_overlay_url")]
    pub url: String,

    /// Whether a missing overlay in a directory source aborts bootstrap.
    /// Remote overlays must always answer 2xx.
    #[serde(default)]
    pub required: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            base: default_overlay_base(),
            url: default_overlay_url(),
            required: false,
        }
    }
}

fn default_overlay_base() -> String {
    ".".to_string()
}

fn default_overlay_url() -> String {
    DEFAULT_OVERLAY_URL.to_string()
}

/// Renderer preference storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceSettings {
    #[serde(default = "default_preferences_path")]
    pub path: PathBuf,
}

impl Default for PreferenceSettings {
    fn default() -> Self {
        Self {
            path: default_preferences_path(),
        }
    }
}

fn default_preferences_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".tierkit").join("preferences.json"))
        .unwrap_or_else(|| PathBuf::from(".tierkit/preferences.json"))
}

/// Tier definitions replacing the embedded defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Status workflow replacing the built-in Spike statuses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Settings {
    /// Load settings from a single YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse settings in {}", path.display()))?;
        Ok(settings)
    }
}
