//! Validator facade: one error per call, routed through an error handler.

use crate::constraint::{Constraint, RuleSet};
use crate::error::{FieldError, ValidationError};
use crate::evaluator::{Evaluate, Evaluator};
use crate::tracing_macros::trace_debug;
use serde::Serialize;
use serde_json::Value;
use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Strategy invoked with the formatted message of the first failing field.
///
/// Returning `Err` escalates the failure to the caller of
/// [`Validator::validate`]; returning `Ok` hands back a value instead.
pub trait ErrorHandler: Send + Sync {
    type Output;

    fn handle(&self, message: String) -> Result<Self::Output, ValidationError>;
}

/// Default handler: every failure becomes [`ValidationError::Rejected`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FailFast;

impl ErrorHandler for FailFast {
    type Output = Infallible;

    fn handle(&self, message: String) -> Result<Infallible, ValidationError> {
        Err(ValidationError::Rejected(message))
    }
}

/// Non-escalating handler that returns the message.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReturnMessage;

impl ErrorHandler for ReturnMessage {
    type Output = String;

    fn handle(&self, message: String) -> Result<String, ValidationError> {
        Ok(message)
    }
}

impl<F, T> ErrorHandler for F
where
    F: Fn(String) -> Result<T, ValidationError> + Send + Sync,
{
    type Output = T;

    fn handle(&self, message: String) -> Result<T, ValidationError> {
        self(message)
    }
}

/// Validates records field by field and stops at the first failure.
///
/// ```rust
/// use fieldrule::{resolve_alias, Constraint, RuleSet, Validator, ReturnMessage};
/// use serde_json::json;
///
/// let rules = RuleSet::new()
///     .field("name", resolve_alias("string", Constraint::new()))
///     .field("age", resolve_alias("int", Constraint::new()));
///
/// let validator = Validator::new().configure(ReturnMessage);
/// let message = validator.validate(&rules, &json!({ "name": "ann" })).unwrap();
/// assert_eq!(message.as_deref(), Some("[missing_field] field:age required"));
/// ```
pub struct Validator<H = FailFast> {
    evaluator: Arc<dyn Evaluate>,
    handler: H,
}

impl Validator<FailFast> {
    /// A validator over [`Evaluator::standard`] with the fail-fast handler.
    pub fn new() -> Self {
        Self::with_evaluator(Evaluator::standard())
    }

    /// A validator over a caller-supplied evaluator.
    pub fn with_evaluator(evaluator: impl Evaluate + 'static) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
            handler: FailFast,
        }
    }
}

impl Default for Validator<FailFast> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ErrorHandler> Validator<H> {
    /// Replace the error handler.
    pub fn configure<H2: ErrorHandler>(self, handler: H2) -> Validator<H2> {
        Validator {
            evaluator: self.evaluator,
            handler,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Validate `data` against `rules`.
    ///
    /// Fields are checked one at a time in insertion order. The first
    /// failing field is passed to the handler and nothing after it is
    /// evaluated. Returns `Ok(None)` when every field passes.
    pub fn validate(
        &self,
        rules: &RuleSet,
        data: &Value,
    ) -> Result<Option<H::Output>, ValidationError> {
        for (field, constraint) in rules.iter() {
            if let Some(message) = self.first_error(field, constraint, data)? {
                return self.handler.handle(message).map(Some);
            }
        }
        Ok(None)
    }

    /// Serialize `data` to JSON, then [`validate`](Self::validate) it.
    pub fn validate_serialized<T: Serialize + ?Sized>(
        &self,
        rules: &RuleSet,
        data: &T,
    ) -> Result<Option<H::Output>, ValidationError> {
        let value = serde_json::to_value(data)
            .map_err(|e| ValidationError::InvalidInput(e.to_string()))?;
        self.validate(rules, &value)
    }

    fn first_error(
        &self,
        field: &str,
        constraint: &Constraint,
        data: &Value,
    ) -> Result<Option<String>, ValidationError> {
        let single = RuleSet::singleton(field, constraint.clone());
        let Some(errors) = self.evaluator.evaluate(&single, data)? else {
            return Ok(None);
        };
        let Some(first) = errors.first() else {
            return Ok(None);
        };
        trace_debug!(field = %first.field, code = %first.code, "field failed validation");
        Ok(Some(format_message(constraint, first)))
    }
}

fn format_message(constraint: &Constraint, error: &FieldError) -> String {
    match constraint.message() {
        Some(custom) => custom.to_string(),
        None => error.to_string(),
    }
}

impl<H: fmt::Debug> fmt::Debug for Validator<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}

static DEFAULT_VALIDATOR: OnceLock<Validator> = OnceLock::new();

/// Process-wide validator with the standard evaluator and [`FailFast`].
pub fn validator() -> &'static Validator {
    DEFAULT_VALIDATOR.get_or_init(Validator::new)
}
