//! Error types for document operations.

use thiserror::Error;

/// Result type for document operations.
pub type ComposerResult<T> = Result<T, ComposerError>;

/// Errors that can occur while mutating or loading a document.
///
/// Unknown element kinds and unknown ids passed to `move_element` are not
/// errors: they are silent no-ops on the store.
#[derive(Debug, Error)]
pub enum ComposerError {
    /// An element id appears twice in the document tree.
    #[error("Duplicate element id: {0}")]
    DuplicateElementId(String),

    /// A table's data grid does not match its declared dimensions.
    #[error("Invalid table grid: {0}")]
    InvalidTable(String),

    /// A style value is outside its allowed range.
    #[error("Invalid style value: {0}")]
    InvalidStyle(String),

    /// An element id string could not be parsed.
    #[error("Invalid element id: {0}")]
    InvalidId(String),

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
