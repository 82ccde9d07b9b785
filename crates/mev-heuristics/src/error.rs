//! Error types for the detection engine.

use thiserror::Error;

/// A single field that could not be parsed into its typed form.
///
/// Raised inside one analyzer and absorbed there; it never aborts sibling
/// analyzers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Failures that affect a whole analysis or an engine operation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("transaction record must be a JSON object")]
    NotAnObject,
    #[error("field `{field}` has an unusable type: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("engine state poisoned: {0}")]
    StatePoisoned(&'static str),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
