//! Engine error taxonomy and the field-keyed validation report.
//!
//! Validation collects every failure instead of stopping at the first, so
//! callers can highlight each offending field. No error here is fatal: a
//! failed operation yields a value and leaves the engine ready for the
//! next call.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::types::EntityId;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Aggregated result of validating one draft or patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A report carrying exactly one failure.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut report = Self::new();
        report.push(field, message);
        report
    }

    /// Record a failure for `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Append failures collected elsewhere (e.g. by the rubric engine).
    pub fn extend(&mut self, errors: Vec<FieldError>) {
        self.errors.extend(errors);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether a failure was recorded for `field`.
    pub fn contains_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Render the wire-format `{ field: message }` map.
    ///
    /// When a field collected more than one failure, the first message wins
    /// (the map keys the wire contract, the vec keeps the full record).
    pub fn error_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for e in &self.errors {
            map.entry(e.field.clone()).or_insert_with(|| e.message.clone());
        }
        map
    }

    /// Promote to an error value if any failure was recorded.
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(CoreError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for e in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// One or more field-level validation failures. Always recoverable;
    /// the caller re-prompts with corrected input.
    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    /// A referenced id does not exist in the target collection.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: EntityId },

    /// A bounded operation (resubmission) has hit its configured cap.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    /// The caller's state is stale or the transition is not permitted
    /// from the current state.
    #[error("Conflict: {0}")]
    Conflict(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
