//! Error types for the SQL AST translator.

use crate::ast::ParameterId;
use thiserror::Error;

/// The main error type for translation.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The construct has no rendering under the active capability set.
    #[error("Unsupported construct: {0}")]
    Unsupported(String),

    /// A locking request cannot be honored as written.
    #[error("Locking with {clause} is not supported")]
    LockingNotSupported { clause: &'static str },

    /// A parameter value was needed while folding SQL text but none was bound.
    #[error("No binding available for parameter {0}")]
    MissingBinding(ParameterId),

    /// The statement tree violates an invariant the translator relies on.
    #[error("Malformed statement tree: {0}")]
    MalformedTree(String),

    /// Invalid capability profile or dialect name.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Writing a value into a prepared statement slot failed.
    #[error("Bind error at position {position}: {message}")]
    Bind { position: usize, message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML profile could not be decoded.
    #[error("Invalid dialect profile: {0}")]
    Profile(#[from] toml::de::Error),

    /// JSON statement could not be decoded.
    #[error("Invalid statement JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl TranslateError {
    /// Create an unsupported-construct error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// Create a malformed-tree error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedTree(message.into())
    }

    /// Create a bind error for the given slot.
    pub fn bind(position: usize, message: impl Into<String>) -> Self {
        Self::Bind {
            position,
            message: message.into(),
        }
    }
}

/// Result type alias for translation.
pub type TranslateResult<T> = Result<T, TranslateError>;
