//! Error types shared by the trees, the reducer and persistence.
//!
//! `TreeError` is raised synchronously by structural operations.
//! `SceneError` is the value that travels inside `Message::Error` and
//! `Status::Error`; it is stored as a plain [`ErrorRecord`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural violations raised by widget and mixer tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The id is already present somewhere in the forest.
    #[error("Duplicate id '{id}'")]
    Duplicate { id: String },

    /// The target (or parent) id is absent or resolves to the wrong node kind.
    #[error("Id '{id}' not found")]
    NotFound { id: String },
}

/// Classification of a [`SceneError`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateId,
    NotFound,
    BackendFailure,
    UnhandledMessage,
    /// Any other named error, kept verbatim so it round-trips.
    Other(String),
}

impl ErrorKind {
    /// Stable name used in the persisted record.
    pub fn name(&self) -> &str {
        match self {
            Self::DuplicateId => "DuplicateIdError",
            Self::NotFound => "NotFoundError",
            Self::BackendFailure => "BackendFailure",
            Self::UnhandledMessage => "UnhandledMessageError",
            Self::Other(name) => name,
        }
    }

    /// Inverse of [`ErrorKind::name`]. Unknown names become `Other`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "DuplicateIdError" => Self::DuplicateId,
            "NotFoundError" => Self::NotFound,
            "BackendFailure" => Self::BackendFailure,
            "UnhandledMessageError" => Self::UnhandledMessage,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Error value carried through the message pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(into = "ErrorRecord", from = "ErrorRecord")]
#[error("{}: {}", .kind.name(), .message)]
pub struct SceneError {
    pub kind: ErrorKind,
    pub message: String,
    /// Rendered source chain, when the error wrapped another error.
    pub stack: Option<String>,
}

impl SceneError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Error for a message kind no reducer case handles.
    pub fn unhandled(kind: &str) -> Self {
        Self::new(
            ErrorKind::UnhandledMessage,
            format!("Unhandled message kind '{}'", kind),
        )
    }

    /// Wrap a backend failure, keeping its source chain as the stack.
    pub fn backend(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(inner) = source {
            chain.push(inner.to_string());
            source = inner.source();
        }
        let error = Self::new(ErrorKind::BackendFailure, err.to_string());
        if chain.is_empty() {
            error
        } else {
            error.with_stack(chain.join("\n"))
        }
    }

    pub fn is(&self, kind: &ErrorKind) -> bool {
        &self.kind == kind
    }
}

impl From<TreeError> for SceneError {
    fn from(err: TreeError) -> Self {
        let kind = match err {
            TreeError::Duplicate { .. } => ErrorKind::DuplicateId,
            TreeError::NotFound { .. } => ErrorKind::NotFound,
        };
        Self::new(kind, err.to_string())
    }
}

/// Plain stored form of a [`SceneError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl From<SceneError> for ErrorRecord {
    fn from(err: SceneError) -> Self {
        Self {
            name: err.kind.name().to_string(),
            message: err.message,
            stack: err.stack,
        }
    }
}

impl From<ErrorRecord> for SceneError {
    fn from(record: ErrorRecord) -> Self {
        Self {
            kind: ErrorKind::from_name(&record.name),
            message: record.message,
            stack: record.stack,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("decode failed")]
    struct Outer {
        #[source]
        source: std::io::Error,
    }

    #[test]
    fn tree_error_maps_kind() {
        let err: SceneError = TreeError::NotFound {
            id: "missing".to_string(),
        }
        .into();
        assert!(err.is(&ErrorKind::NotFound));
        assert!(err.message.contains("missing"));
    }

    #[test]
    fn backend_error_keeps_source_chain() {
        let outer = Outer {
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let err = SceneError::backend(&outer);
        assert_eq!(err.kind, ErrorKind::BackendFailure);
        assert_eq!(err.message, "decode failed");
        assert_eq!(err.stack.as_deref(), Some("no such file"));
    }

    #[test]
    fn record_round_trip_preserves_unknown_names() {
        let err = SceneError::new(ErrorKind::Other("ScriptError".to_string()), "bad step");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["name"], "ScriptError");
        assert!(json.get("stack").is_none());

        let back: SceneError = serde_json::from_value(json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn display_uses_record_name() {
        let err = SceneError::unhandled("Custom:jump");
        assert_eq!(
            err.to_string(),
            "UnhandledMessageError: Unhandled message kind 'Custom:jump'"
        );
    }
}
