//! Configuration: tier composition, overlay bootstrap, and tool settings.
//!
//! ## Application configuration
//! Tier definitions (core → core-ag → themes → sites → apps → applets) are
//! composed bottom-up into [`ConfigurationNode`]s. The highest tier is
//! projected into a JSON tree, an overlay document is deep-merged onto it once,
//! and consumers read dotted paths from the resulting [`AppConfig`].
//!
//! ## Tool settings
//! [`Settings`] are merged field-by-field from three tiers:
//! 1. **Defaults** - compiled in
//! 2. **Project** - `$CWD/tierkit/settings.yaml`
//! 3. **User** - `~/.tierkit/settings.yaml`, then environment variables
//!
//! A `statuses.yaml` next to the project settings replaces the built-in
//! status workflow unless `workflow.path` names another file.
//!
//! ## Environment Variables
//! - `TIERKIT_SETTINGS_PATH` - Explicit settings file (overrides all)
//! - `TIERKIT_FORMS_BASE` - Form document directory or URL
//! - `TIERKIT_FORM_ENGINE` - `formly` or `json_forms`
//! - `TIERKIT_OVERLAY_URL` - Overlay document location
//! - `TIERKIT_PREFERENCES_PATH` - Renderer preference file
//! - `TIERKIT_API_URL` - API base substituted into tier templates
//! - `TIERKIT_USER_DIR` - User settings dir (default: `~/.tierkit`)
//! - `TIERKIT_PROJECT_DIR` - Project settings dir (default: `./tierkit`)

mod loader;
mod merge;
mod overlay;
mod path;
mod template;
mod tiers;
mod types;

pub use loader::{SETTINGS_FILE, STATUSES_FILE, SettingsLoader, SettingsPaths, SettingsTier};
pub use merge::{deep_merge, deep_merge_all, deep_merge_overlay};
pub use overlay::{AppConfig, ConfigGate, ConfigReader, DEFAULT_OVERLAY_URL, UnconfiguredConfig};
pub use path::{resolve_dot_path, resolve_dot_path_or, resolve_dot_path_str};
pub use template::{format_template, placeholder_count};
pub use tiers::{
    BaseConfig, ConfigurationNode, Constants, DEFAULT_TIERS_YAML, Environment, Tier,
    TierDefinition, TierDefinitions, TierExtensions, TierSet, UrlNode, UrlTree, compose_tier,
};
pub use types::*;
