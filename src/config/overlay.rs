//! Bootstrap of the application configuration.
//!
//! The composed tiers are projected into one JSON tree. A remote overlay
//! document is deep-merged onto it exactly once, and only the resulting
//! [`AppConfig`] exposes reads. [`ConfigGate`] lets consumers that start
//! early wait until that has happened.

use super::merge::deep_merge_overlay;
use super::path::{resolve_dot_path, resolve_dot_path_or, resolve_dot_path_str};
use super::tiers::{ConfigurationNode, Tier, TierSet};
use crate::error::{ConfigError, OverlayError, SourceError};
use crate::source::DocumentSource;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Default location of the overlay document.
pub const DEFAULT_OVERLAY_URL: &str = "/config.json";

/// Static defaults that have not had their overlay applied yet.
#[derive(Debug, Clone)]
pub struct UnconfiguredConfig {
    tiers: Arc<TierSet>,
    tree: Value,
}

impl UnconfiguredConfig {
    /// Project the highest composed tier into the default tree.
    pub fn from_tiers(tiers: TierSet) -> Result<Self, ConfigError> {
        let tree = tiers
            .top()
            .map(|node| node.to_value())
            .ok_or_else(|| ConfigError::MissingAncestor {
                tier: "configuration".to_string(),
                missing: Tier::Core.as_str().to_string(),
            })?;
        Ok(Self {
            tiers: Arc::new(tiers),
            tree,
        })
    }

    /// Finish without an overlay.
    pub fn without_overlay(self) -> AppConfig {
        AppConfig {
            tiers: self.tiers,
            tree: Arc::new(self.tree),
            overlay_source: None,
        }
    }

    /// Deep-merge `overlay` onto the defaults. `origin` names where it came from.
    pub fn apply_overlay(mut self, overlay: Value, origin: &str) -> Result<AppConfig, OverlayError> {
        if !overlay.is_object() {
            return Err(OverlayError::NotAnObject {
                url: origin.to_string(),
            });
        }
        deep_merge_overlay(&mut self.tree, overlay);
        Ok(AppConfig {
            tiers: self.tiers,
            tree: Arc::new(self.tree),
            overlay_source: Some(origin.to_string()),
        })
    }

    /// Fetch the overlay at `location` from `source` and apply it.
    ///
    /// With `required == false` a document missing from a local source keeps
    /// the defaults. Any non-2xx answer from a remote source aborts, 404
    /// included, as does every other fetch or parse failure.
    pub async fn bootstrap(
        self,
        source: &dyn DocumentSource,
        location: &str,
        required: bool,
    ) -> Result<AppConfig, OverlayError> {
        let url = source.describe(location);
        let content = match source.fetch(location).await {
            Ok(content) => content,
            Err(SourceError::NotFound { .. }) if !required && !source.is_remote() => {
                warn!(url = %url, "No configuration overlay found, using defaults");
                return Ok(self.without_overlay());
            }
            Err(err) => {
                let status = match err {
                    SourceError::Http { status, .. } => status,
                    SourceError::NotFound { .. } => "404 Not Found".to_string(),
                    other => other.to_string(),
                };
                return Err(OverlayError::Fetch { url, status });
            }
        };

        let overlay: Value = serde_json::from_str(&content).map_err(|e| OverlayError::Parse {
            url: url.clone(),
            message: e.to_string(),
        })?;
        let config = self.apply_overlay(overlay, &url)?;
        info!(url = %url, "Applied configuration overlay");
        Ok(config)
    }
}

/// The configured, read-only application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    tiers: Arc<TierSet>,
    tree: Arc<Value>,
    overlay_source: Option<String>,
}

impl AppConfig {
    /// The merged configuration tree.
    pub fn tree(&self) -> &Value {
        &self.tree
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        resolve_dot_path(&self.tree, path)
    }

    pub fn get_or(&self, path: &str, default: Value) -> Value {
        resolve_dot_path_or(&self.tree, path, default)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        resolve_dot_path_str(&self.tree, path)
    }

    /// The statically composed node for `tier`, without overlay changes.
    pub fn tier(&self, tier: Tier) -> Option<&Arc<ConfigurationNode>> {
        self.tiers.get(tier)
    }

    pub fn tiers(&self) -> &TierSet {
        &self.tiers
    }

    /// Where the overlay came from, if one was applied.
    pub fn overlay_source(&self) -> Option<&str> {
        self.overlay_source.as_deref()
    }
}

/// Readiness barrier between bootstrap and configuration consumers.
pub struct ConfigGate {
    tx: watch::Sender<Option<Arc<AppConfig>>>,
}

/// Consumer side of a [`ConfigGate`].
#[derive(Clone)]
pub struct ConfigReader {
    rx: watch::Receiver<Option<Arc<AppConfig>>>,
}

impl ConfigGate {
    pub fn new() -> (Self, ConfigReader) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, ConfigReader { rx })
    }

    /// Publish the configuration. Only the first call has any effect.
    pub fn open(&self, config: AppConfig) -> bool {
        let config = Arc::new(config);
        self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(config);
            true
        })
    }

    pub fn reader(&self) -> ConfigReader {
        ConfigReader {
            rx: self.tx.subscribe(),
        }
    }
}

impl ConfigReader {
    /// Wait for the configuration. Returns `None` if the gate was dropped
    /// without ever opening.
    pub async fn ready(&mut self) -> Option<Arc<AppConfig>> {
        let guard = self.rx.wait_for(Option::is_some).await.ok()?;
        guard.clone()
    }

    /// The configuration if it is already available.
    pub fn try_get(&self) -> Option<Arc<AppConfig>> {
        self.rx.borrow().clone()
    }
}
