//! Document sources for overlays and form definitions.
//!
//! A source maps a relative location such as `spike.edit.form.yml` to text.
//! HTTP and directory sources share one trait so the loaders never care where
//! documents live.

use crate::error::SourceError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("tierkit/", env!("CARGO_PKG_VERSION"));

/// Something that can fetch a text document by relative location.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the document at `location`.
    ///
    /// A missing document is [`SourceError::NotFound`]; other failures carry
    /// the URL or path that was tried.
    async fn fetch(&self, location: &str) -> Result<String, SourceError>;

    /// Human-readable address of `location`, used in error messages.
    fn describe(&self, location: &str) -> String;

    /// Whether documents come from a server. A remote 404 is a failed
    /// request, never a merely absent file.
    fn is_remote(&self) -> bool {
        false
    }
}

/// Fetches documents over HTTP relative to a base URL.
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Failed to build HTTP client, falling back to defaults without timeout");
                reqwest::Client::new()
            }
        };
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    fn url_for(&self, location: &str) -> String {
        if location.starts_with("http://") || location.starts_with("https://") {
            return location.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            location.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self, location: &str) -> Result<String, SourceError> {
        let url = self.url_for(location);
        debug!(url = %url, "Fetching document");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound { location: url });
        }
        if !status.is_success() {
            return Err(SourceError::Http {
                url,
                status: status.to_string(),
            });
        }

        response.text().await.map_err(|e| SourceError::Network {
            url,
            message: e.to_string(),
        })
    }

    fn describe(&self, location: &str) -> String {
        self.url_for(location)
    }

    fn is_remote(&self) -> bool {
        true
    }
}

/// Reads documents from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `location` under the root. Locations that climb out of the
    /// root are treated as missing.
    fn path_for(&self, location: &str) -> Option<PathBuf> {
        let relative = Path::new(location.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl DocumentSource for DirSource {
    async fn fetch(&self, location: &str) -> Result<String, SourceError> {
        let path = self.path_for(location).ok_or_else(|| SourceError::NotFound {
            location: location.to_string(),
        })?;
        debug!(path = %path.display(), "Reading document");

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(SourceError::NotFound {
                location: path.display().to_string(),
            }),
            Err(source) => Err(SourceError::Io { path, source }),
        }
    }

    fn describe(&self, location: &str) -> String {
        self.path_for(location)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| location.to_string())
    }
}

/// In-memory documents keyed by location.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, location: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(location, content);
        self
    }

    pub fn insert(&mut self, location: impl Into<String>, content: impl Into<String>) {
        self.documents.insert(location.into(), content.into());
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn fetch(&self, location: &str) -> Result<String, SourceError> {
        self.documents
            .get(location.trim_start_matches('/'))
            .or_else(|| self.documents.get(location))
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                location: location.to_string(),
            })
    }

    fn describe(&self, location: &str) -> String {
        format!("memory:{}", location)
    }
}

/// Open the source matching `base`: HTTP for `http(s)://` URLs, a directory otherwise.
pub fn open_source(base: &str) -> Arc<dyn DocumentSource> {
    if base.starts_with("http://") || base.starts_with("https://") {
        Arc::new(HttpSource::new(base))
    } else {
        Arc::new(DirSource::new(base))
    }
}
