//! Error types for the fuseq query engine.

use thiserror::Error;

/// Result type alias using FuseError.
pub type Result<T> = std::result::Result<T, FuseError>;

/// Errors that can occur while answering a query.
#[derive(Error, Debug)]
pub enum FuseError {
    /// Malformed query, rejected before any network call.
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    /// A candidate source failed or timed out.
    ///
    /// Recovered locally via partial-source fusion when at least one
    /// other source survives.
    #[error("Source '{name}' unavailable: {reason}")]
    SourceUnavailable { name: String, reason: String },

    /// Every candidate source failed; the query cannot be answered.
    #[error("All candidate sources unavailable: {}", reasons.join("; "))]
    AllSourcesUnavailable { reasons: Vec<String> },

    /// Embedding model error.
    #[error("Embedding error: {message}")]
    Embedding { message: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error (unexpected).
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl FuseError {
    /// Create an invalid query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Create a source unavailable error.
    pub fn source_unavailable(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            name: source.into(),
            reason: reason.into(),
        }
    }

    /// Create an embedding error.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidQuery { .. } => "INVALID_QUERY",
            Self::SourceUnavailable { .. } => "SOURCE_UNAVAILABLE",
            Self::AllSourcesUnavailable { .. } => "ALL_SOURCES_UNAVAILABLE",
            Self::Embedding { .. } => "EMBEDDING_ERROR",
            Self::Config { .. } => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}
