//! Field-level validation error
//!
//! Constructed per request by the field validator and rendered into the
//! `{errors: [...]}` part of 400 responses. Never persisted.

use serde::{Deserialize, Serialize};

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Name of the offending field as submitted
    pub field: String,
    /// Human-readable message, e.g. "Title is required"
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
