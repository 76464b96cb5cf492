//! Error types for conversion operations

use thiserror::Error;

/// Errors that can occur while mapping, exporting or importing block trees.
///
/// Importers never fail on unrecognized markup (they degrade to paragraphs), so
/// most variants describe structural problems in caller-provided trees.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),

    /// Format does not support the requested direction
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// Block type is not registered in the schema
    #[error("Unknown block type '{0}'")]
    UnknownBlockType(String),

    /// Block content does not have the shape its schema entry declares
    #[error("Structural mismatch in '{block_type}' block: {reason}")]
    StructuralMismatch { block_type: String, reason: String },

    /// Prop is not declared for the block type, or its value is not allowed
    #[error("Invalid prop '{prop}' on '{block_type}' block: {reason}")]
    InvalidProp {
        block_type: String,
        prop: String,
        reason: String,
    },

    /// Style type is not registered, or its value kind does not match
    #[error("Invalid style '{style}': {reason}")]
    InvalidStyle { style: String, reason: String },

    /// The rich-document tree does not follow the container/content/group convention
    #[error("Malformed nesting: {0}")]
    MalformedNesting(String),

    /// Position outside of the document, or not pointing where it should
    #[error("Invalid position {pos}: {reason}")]
    InvalidPosition { pos: usize, reason: String },

    /// Error during serialization
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// One-time formatting dependency setup failed (retried on the next call)
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// Block tree JSON could not be read or written
    #[error("JSON error: {0}")]
    Json(String),
}

impl ConversionError {
    pub(crate) fn mismatch(block_type: &str, reason: impl Into<String>) -> Self {
        ConversionError::StructuralMismatch {
            block_type: block_type.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ConversionError {
    fn from(err: serde_json::Error) -> Self {
        ConversionError::Json(err.to_string())
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = ConversionError> = std::result::Result<T, E>;
