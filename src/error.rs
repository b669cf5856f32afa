//! Error types for chemcache
//!
//! All modules use `ChemResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for chemcache operations
pub type ChemResult<T> = Result<T, ChemError>;

/// All errors that can occur in chemcache
#[derive(Error, Debug)]
pub enum ChemError {
    // Lookup errors
    #[error("Compound '{0}' is not available offline")]
    Offline(String),

    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Lookup failed for {identifier}: {reason}")]
    Remote { identifier: String, reason: String },

    #[error("Operation cancelled before it started")]
    Cancelled,

    // Storage errors
    #[error("Store error in namespace {namespace}: {reason}")]
    Store { namespace: String, reason: String },

    #[error("Saved structure not found: {0}")]
    StructureNotFound(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl ChemError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a transient remote failure
    pub fn remote(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Remote {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Create a store failure for a namespace
    pub fn store(namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Store {
            namespace: namespace.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::Cancelled)
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Offline(_) => Some("Run: chemcache offline off"),
            Self::Remote { .. } => Some("The lookup service may be busy. Retry in a moment"),
            Self::ConfigInvalid { .. } => Some("Run: chemcache config init --force"),
            _ => None,
        }
    }
}
