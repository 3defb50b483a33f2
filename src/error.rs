//! Error types for actionsmith.
//!
//! Fatal errors always name the offending entity (action reference, step id,
//! or cycle members) so the caller can point the user at the exact part of
//! the graph that needs fixing.

use thiserror::Error;

/// Result type alias for actionsmith operations.
pub type Result<T> = std::result::Result<T, Error>;

/// actionsmith error types.
#[derive(Error, Debug)]
pub enum Error {
    /// An action reference that does not match `owner/repo[@ref]`.
    #[error("Malformed action reference '{0}': expected owner/repo[@ref]")]
    Reference(String),

    /// A workflow that cannot be projected to its persisted form.
    #[error("State error: {0}")]
    State(String),

    /// Persisted data referencing entities that no longer exist.
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// A rejected graph mutation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A dependency cycle among workflow steps.
    #[error("Cycle detected among steps: {}", steps.join(", "))]
    Cycle {
        /// Ids of the steps participating in the cycle.
        steps: Vec<String>,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Host error: {0}")]
    Host(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get a stable error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Reference(_) => "REFERENCE_ERROR",
            Error::State(_) => "STATE_ERROR",
            Error::Integrity(_) => "INTEGRITY_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Cycle { .. } => "CYCLE_ERROR",
            Error::Storage(_) => "STORAGE_ERROR",
            Error::Host(_) => "HOST_ERROR",
            Error::Http(_) => "HTTP_ERROR",
            Error::Database(_) => "DATABASE_ERROR",
            Error::Yaml(_) => "YAML_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }
}
