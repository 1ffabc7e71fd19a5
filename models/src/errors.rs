// models/src/errors.rs

use std::collections::BTreeMap;

use serde::Serialize;
pub use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("End date cannot be before start date")]
    EndBeforeStart,
    #[error("'{0}' is not a valid status")]
    InvalidStatus(String),
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
}

/// A type alias for a `Result` that returns a `ModelError` on failure.
pub type ModelResult<T> = Result<T, ModelError>;

/// Validation failures keyed by input field, serialized as
/// `{"field": ["message", ...]}` in 400 responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, messages.join(", "))?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_accumulate_per_field() {
        let mut errs = FieldErrors::new();
        errs.push("end_date", "End date cannot be before start date");
        errs.push("patient", "Patient does not exist.");
        errs.push("patient", "This field is required.");

        assert!(!errs.is_empty());
        assert!(errs.contains("end_date"));
        let inner = errs.into_inner();
        assert_eq!(inner["patient"].len(), 2);
    }

    #[test]
    fn field_errors_serialize_as_plain_map() {
        let mut errs = FieldErrors::new();
        errs.push("end_date", "End date cannot be before start date");
        let json = serde_json::to_value(&errs).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"end_date": ["End date cannot be before start date"]})
        );
    }
}
