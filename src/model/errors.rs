//! Model error types

use serde_json::Value;
use thiserror::Error;

use super::value::FieldType;

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building or mutating a record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("invalid value for {field}: expected {expected}, got {actual}")]
    InvalidFieldValue {
        field: String,
        expected: FieldType,
        actual: FieldType,
    },

    #[error("value of {field} has no field representation: {value}")]
    Unrepresentable { field: String, value: String },

    #[error("invalid timestamp for {field}: {value}")]
    InvalidTimestamp { field: String, value: String },

    #[error("field is not assignable: {0}")]
    ProtectedField(String),
}

impl ModelError {
    pub(crate) fn unrepresentable(field: &str, value: &Value) -> Self {
        ModelError::Unrepresentable {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Returns the field this error refers to
    pub fn field(&self) -> &str {
        match self {
            ModelError::InvalidFieldValue { field, .. }
            | ModelError::Unrepresentable { field, .. }
            | ModelError::InvalidTimestamp { field, .. }
            | ModelError::ProtectedField(field) => field,
        }
    }
}
