//! Service Layer Error Types
//!
//! This module defines the error taxonomy shared by the tree mutation engine,
//! the schema import engine and the designer session.
//!
//! All of these errors are local and recoverable: an operation that returns
//! an error has left the forest exactly as it found it.

use crate::models::{FieldId, ValidationError};
use thiserror::Error;

/// Field tree operation errors
///
/// Provides high-level error types for every tree-facing operation,
/// with enough context to surface a message to the user.
#[derive(Error, Debug)]
pub enum FormTreeError {
    /// Operation referenced a node or template that does not exist
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// Insert/move/update targeted a node that cannot accept it
    #[error("Invalid target {target}: {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Import/export payload is not well-formed structured data
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Two sibling properties would share the same key at one schema level
    #[error("Schema mismatch: key '{key}' already used at this level by {existing}")]
    SchemaMismatch { key: String, existing: FieldId },

    /// A restored or patched forest violates a structural invariant
    #[error("Field validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

impl FormTreeError {
    /// Create a not found error for a node id
    pub fn node_not_found(id: FieldId) -> Self {
        Self::NotFound {
            what: format!("node {}", id),
        }
    }

    /// Create a not found error for any named resource
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create an invalid target error
    pub fn invalid_target(target: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            target: target.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a key collision error
    pub fn schema_mismatch(key: impl Into<String>, existing: FieldId) -> Self {
        Self::SchemaMismatch {
            key: key.into(),
            existing,
        }
    }

    /// Whether the error only signals a missing node (treated as a no-op by callers)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for FormTreeError {
    fn from(err: serde_json::Error) -> Self {
        FormTreeError::ParseError(err.to_string())
    }
}
