//! Error types reported by the evaluator and the validator facade.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Code reported when a required value is absent or null.
pub const CODE_MISSING_FIELD: &str = "missing_field";
/// Code reported for every other violation.
pub const CODE_INVALID: &str = "invalid";

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path of the field that failed (`name`, `address.city`, `tags[1]`)
    pub field: String,
    /// `missing_field` or `invalid`
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// A `missing_field` error for a required value.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, CODE_MISSING_FIELD, "required")
    }

    /// An `invalid` error with the given message.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, CODE_INVALID, message)
    }

    /// Prepend a parent path to this error's field.
    ///
    /// Index segments (`[0]`) attach directly, names are joined with a dot.
    pub(crate) fn under(mut self, parent: &str) -> Self {
        self.field = if self.field.starts_with('[') {
            format!("{parent}{}", self.field)
        } else {
            format!("{parent}.{}", self.field)
        };
        self
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] field:{} {}", self.code, self.field, self.message)
    }
}

/// Outcome of a single kind check that did not pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The value itself is wrong.
    Message(String),
    /// Errors found inside the value, with paths relative to it.
    Nested(Vec<FieldError>),
}

impl Violation {
    /// Convenience constructor for a message violation.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Errors from the ID checksum validator, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdCardError {
    #[error("idCard format error")]
    Format,
    #[error("idCard address code error")]
    Region,
    #[error("idCard verify bit error")]
    Checksum,
}

/// Errors surfaced by [`Validator`](crate::Validator) and the evaluator.
///
/// `Rejected` is the escalation produced by the default
/// [`FailFast`](crate::FailFast) handler. The other variants are rule-set
/// mistakes and are returned no matter which handler is configured.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    Rejected(String),

    #[error("rule type must be one of {known}, but the following type was passed: {found}")]
    UnknownType { found: String, known: String },

    #[error("invalid rule for field `{field}`: {reason}")]
    InvalidRule { field: String, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ValidationError {
    /// The escalated message, if this is a rejection.
    pub fn rejection(&self) -> Option<&str> {
        match self {
            Self::Rejected(message) => Some(message),
            _ => None,
        }
    }
}
