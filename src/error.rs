use crate::transport::TransportError;
use serde_json::Value;
use thiserror::Error;

/// Structured error context for validation and configuration failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path that caused the error (e.g., "request.message", "item.title")
    pub field_path: Option<String>,
    /// Additional context about the error
    pub details: Option<String>,
    /// Operation that raised the error (e.g., "rag_chat", "create_item")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for every client operation.
///
/// Whatever the variant, callers can branch on [`Error::status`] and
/// [`Error::message`]; the variant only tells where the failure happened.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller input violated a precondition. Raised before any request is sent.
    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// The server answered with a non-success status.
    #[error("Remote error: HTTP {status}: {message}")]
    Remote {
        status: u16,
        message: String,
        /// Full parsed response body (`Value::Null` when the body was empty).
        body: Value,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    /// A well-formed JSON body did not match the expected response shape.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::validation_with_context(msg, ErrorContext::new())
    }

    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::configuration_with_context(msg, ErrorContext::new())
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Build a remote error from a non-success status and its parsed body.
    ///
    /// The message is the body's `error` string when there is one, otherwise `HTTP <status>`.
    pub fn remote(status: u16, body: Value) -> Self {
        let message = body
            .get("error")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .unwrap_or_else(|| format!("HTTP {}", status));
        Error::Remote {
            status,
            message,
            body,
        }
    }

    /// Human-readable message without the category prefix used by `Display`.
    pub fn message(&self) -> String {
        match self {
            Error::Validation { message, .. }
            | Error::Configuration { message, .. }
            | Error::Remote { message, .. } => message.clone(),
            Error::Transport(TransportError::Http(e)) => e.to_string(),
            Error::Transport(TransportError::InvalidBody(e)) => e.to_string(),
            Error::Transport(e @ TransportError::FrameTooLarge { .. }) => e.to_string(),
            Error::Serialization(e) => e.to_string(),
        }
    }

    /// Status code: the HTTP status for remote errors, 400 for validation errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            Error::Validation { .. } => Some(400),
            _ => None,
        }
    }

    /// Opaque diagnostic payload: the remote response body for [`Error::Remote`].
    ///
    /// Every other variant returns `None`. A [`Error::Transport`] failure (no response, or a
    /// success body that is not JSON) carries its cause only through
    /// [`std::error::Error::source`], as the wrapped `reqwest` or `serde_json` error.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Error::Remote { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Per-field messages from an `{"error": ..., "errors": [...]}` response body.
    pub fn field_errors(&self) -> Vec<String> {
        self.payload()
            .and_then(|b| b.get("errors"))
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|e| e.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Validation { context, .. } | Error::Configuration { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404) && !self.is_validation()
    }
}
