//! Error types for partner-widgets

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::constants::{
    MSG_FORBIDDEN, MSG_INVALID_TOKEN, MSG_NOT_FOUND, MSG_SERVER_ERROR, MSG_UNAUTHENTICATED,
    NON_FIELD_ERRORS,
};

/// Field name -> messages, ordered by field name for stable output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map holding a single message
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut e = Self::new();
        e.add(field, message);
        e
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// First message recorded for a field
    pub fn first(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when empty, otherwise a validation error carrying every field
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(WidgetError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(" "))?;
        }
        Ok(())
    }
}

/// The main error type for service operations
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("{}", MSG_UNAUTHENTICATED)]
    Unauthenticated,
    #[error("{}", MSG_INVALID_TOKEN)]
    InvalidToken,
    #[error("{}", MSG_FORBIDDEN)]
    Forbidden,
    /// Absent or outside the caller's partner; the two are indistinguishable
    #[error("{}", MSG_NOT_FOUND)]
    NotFound,
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("configuration error: {0}")]
    Config(String),
}

/// Outward error body: `{"errors": {<field>: [<message>]}}`
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub errors: FieldErrors,
}

impl WidgetError {
    /// HTTP-style status code for this error
    pub fn status(&self) -> u16 {
        match self {
            WidgetError::Unauthenticated | WidgetError::InvalidToken => 401,
            WidgetError::Forbidden => 403,
            WidgetError::NotFound => 404,
            WidgetError::Validation(_) => 400,
            WidgetError::Storage(_) | WidgetError::Config(_) => 500,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        let errors = match self {
            WidgetError::Validation(fields) => fields.clone(),
            WidgetError::Storage(_) | WidgetError::Config(_) => {
                FieldErrors::single(NON_FIELD_ERRORS, MSG_SERVER_ERROR)
            }
            other => FieldErrors::single(NON_FIELD_ERRORS, other.to_string()),
        };
        ErrorEnvelope { errors }
    }

    /// Field errors when this is a validation failure
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            WidgetError::Validation(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, WidgetError>;

/// Convert any storage-layer error to WidgetError
pub fn err<E: std::error::Error>(e: E) -> WidgetError {
    WidgetError::Storage(e.to_string())
}
