//! Store error types

use thiserror::Error;

/// Errors returned by the template store and the import/export codec
#[derive(Debug, Error)]
pub enum StoreError {
    /// A template is missing a required field (empty title or content)
    #[error("Invalid template: {0}")]
    Validation(String),

    /// An import payload could not be turned into any templates
    #[error("Invalid template format: {0}")]
    Format(String),

    /// The persisted template list is not valid JSON
    #[error("Stored templates are corrupt: {0}")]
    Corrupt(String),

    /// Another writer kept changing the settings document
    #[error("Settings changed concurrently, gave up after {attempts} attempts")]
    Conflict { attempts: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }

    /// Check if this is an import format error
    pub fn is_format(&self) -> bool {
        matches!(self, StoreError::Format(_))
    }

    /// Check if this is a concurrent-write conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Result alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
