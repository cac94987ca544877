//! Structured error types for configuration, forms, and workflow operations.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Composition errors (fatal at bootstrap)
    EmptyTierName,
    ConfigurationDependency,
    TemplateArity,
    TierRetyped,
    TierOutOfOrder,

    // Document errors
    DocumentNotFound,
    FetchFailed,
    ParseFailed,

    // Form errors
    MissingRequiredField,
    InvalidFieldValue,
    FormNotFound,

    // Renderer errors
    UnknownRenderer,
    UnsupportedAction,
    StorageFailed,

    // Workflow errors
    UnknownStatus,
    IllegalTransition,
    InvalidWorkflow,

    InternalError,
}

/// Errors raised while composing tier configurations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("tier name must not be empty")]
    EmptyTierName,

    /// A lower tier was not composed before the tier that depends on it.
    #[error("tier '{tier}' requires '{missing}' to be composed first")]
    MissingAncestor { tier: String, missing: String },

    #[error("template '{template}' expects {expected} argument(s) but {supplied} were supplied")]
    TemplateArity {
        template: String,
        expected: usize,
        supplied: usize,
    },

    /// A tier changed an inherited leaf into a branch or the reverse.
    #[error("tier '{tier}' retypes inherited path '{path}'")]
    Retyped { tier: String, path: String },

    #[error("tier '{tier}' composed after '{previous}'; tiers must be composed in order")]
    OutOfOrder { tier: String, previous: String },

    #[error("unknown tier '{0}'")]
    UnknownTier(String),

    #[error("failed to parse tier definitions: {0}")]
    Parse(String),
}

impl ConfigError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConfigError::EmptyTierName => ErrorCode::EmptyTierName,
            ConfigError::MissingAncestor { .. } => ErrorCode::ConfigurationDependency,
            ConfigError::TemplateArity { .. } => ErrorCode::TemplateArity,
            ConfigError::Retyped { .. } => ErrorCode::TierRetyped,
            ConfigError::OutOfOrder { .. } | ConfigError::UnknownTier(_) => {
                ErrorCode::TierOutOfOrder
            }
            ConfigError::Parse(_) => ErrorCode::ParseFailed,
        }
    }
}

/// Errors raised by a [`crate::source::DocumentSource`].
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("document not found: {location}")]
    NotFound { location: String },

    #[error("HTTP {status} from {url}")]
    Http { url: String, status: String },

    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound { .. })
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SourceError::NotFound { .. } => ErrorCode::DocumentNotFound,
            _ => ErrorCode::FetchFailed,
        }
    }
}

/// Errors raised while fetching and applying the configuration overlay.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("failed to load configuration from {url}: {status}")]
    Fetch { url: String, status: String },

    #[error("configuration at {url} is not valid JSON: {message}")]
    Parse { url: String, message: String },

    #[error("configuration at {url} must be a JSON object")]
    NotAnObject { url: String },
}

impl OverlayError {
    pub fn code(&self) -> ErrorCode {
        match self {
            OverlayError::Fetch { .. } => ErrorCode::FetchFailed,
            OverlayError::Parse { .. } | OverlayError::NotAnObject { .. } => {
                ErrorCode::ParseFailed
            }
        }
    }
}

/// Errors raised while loading or validating form definitions.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("invalid form definition at {location}: missing required field '{field}'")]
    MissingField { location: String, field: String },

    #[error("invalid field '{key}' in form '{form_id}': {reason}")]
    InvalidField {
        form_id: String,
        key: String,
        reason: String,
    },

    #[error("form not found: {form_id} (mode: {mode})")]
    NotFound { form_id: String, mode: String },

    #[error("failed to parse {location}: {message}")]
    Parse { location: String, message: String },

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl FormError {
    pub fn missing_field(location: impl Into<String>, field: &str) -> Self {
        FormError::MissingField {
            location: location.into(),
            field: field.to_string(),
        }
    }

    pub fn invalid_field(form_id: &str, key: &str, reason: impl Into<String>) -> Self {
        FormError::InvalidField {
            form_id: form_id.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            FormError::MissingField { .. } => ErrorCode::MissingRequiredField,
            FormError::InvalidField { .. } => ErrorCode::InvalidFieldValue,
            FormError::NotFound { .. } => ErrorCode::FormNotFound,
            FormError::Parse { .. } => ErrorCode::ParseFailed,
            FormError::Source(err) => err.code(),
        }
    }
}

/// Errors raised by renderer registration and preference updates.
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("unknown renderer '{0}'")]
    UnknownRenderer(String),

    #[error("renderer '{renderer_id}' does not support '{action}'")]
    UnsupportedAction { renderer_id: String, action: String },

    #[error("failed to store preferences at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RendererError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RendererError::UnknownRenderer(_) => ErrorCode::UnknownRenderer,
            RendererError::UnsupportedAction { .. } => ErrorCode::UnsupportedAction,
            RendererError::Storage { .. } => ErrorCode::StorageFailed,
        }
    }
}

/// Errors raised by the status workflow.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("unknown status '{0}'")]
    UnknownStatus(String),

    #[error("transition from '{from}' to '{to}' is not allowed")]
    IllegalTransition { from: String, to: String },

    #[error("invalid workflow: {0}")]
    Invalid(String),
}

impl WorkflowError {
    pub fn code(&self) -> ErrorCode {
        match self {
            WorkflowError::UnknownStatus(_) => ErrorCode::UnknownStatus,
            WorkflowError::IllegalTransition { .. } => ErrorCode::IllegalTransition,
            WorkflowError::Invalid(_) => ErrorCode::InvalidWorkflow,
        }
    }
}

/// Serializable error body for JSON output.
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorReport {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Build a report from an `anyhow` chain, recovering the code of a known error type.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let code = if let Some(e) = err.downcast_ref::<ConfigError>() {
            e.code()
        } else if let Some(e) = err.downcast_ref::<OverlayError>() {
            e.code()
        } else if let Some(e) = err.downcast_ref::<FormError>() {
            e.code()
        } else if let Some(e) = err.downcast_ref::<SourceError>() {
            e.code()
        } else if let Some(e) = err.downcast_ref::<RendererError>() {
            e.code()
        } else if let Some(e) = err.downcast_ref::<WorkflowError>() {
            e.code()
        } else {
            ErrorCode::InternalError
        };
        Self::new(code, format!("{:#}", err))
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
