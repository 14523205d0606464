//! Generic rule evaluator.
//!
//! The evaluator walks a [`RuleSet`] against a JSON record, dispatching
//! each field's `type` to a registered kind and collecting every error it
//! finds. Kinds are plain functions registered by name; the built-in
//! vocabulary lives in [`crate::rules`], the array aliases and `idCard` are
//! added by [`Evaluator::standard`].

use crate::constraint::{Constraint, RuleSet};
use crate::error::{FieldError, ValidationError, Violation};
use crate::tracing_macros::trace_warn;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Result of running one kind against one value.
///
/// `Ok(None)` passes, `Ok(Some(_))` is a validation failure and `Err` is a
/// broken rule set.
pub type KindResult = Result<Option<Violation>, ValidationError>;

/// Type alias for registered kind functions to reduce complexity.
type KindFn = Arc<dyn Fn(&Check<'_>) -> KindResult + Send + Sync>;

/// Everything a kind sees when it is invoked.
#[derive(Clone, Copy)]
pub struct Check<'a> {
    /// Evaluator running the check, for kinds that recurse
    pub evaluator: &'a Evaluator,
    /// Constraint declared for the value
    pub constraint: &'a Constraint,
    /// The value under test (never null for top-level fields)
    pub value: &'a Value,
    /// Record or array that holds the value
    pub parent: &'a Value,
    /// Field name or index segment, for rule errors
    pub field: &'a str,
}

impl<'a> Check<'a> {
    /// The same check applied to a different constraint and value.
    pub fn nested<'b>(
        &self,
        constraint: &'b Constraint,
        value: &'b Value,
        parent: &'b Value,
        field: &'b str,
    ) -> Check<'b>
    where
        'a: 'b,
    {
        Check {
            evaluator: self.evaluator,
            constraint,
            value,
            parent,
            field,
        }
    }

    /// A rule error for the current field.
    pub fn invalid_rule(&self, reason: impl Into<String>) -> ValidationError {
        ValidationError::InvalidRule {
            field: self.field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Contract the validator facade relies on.
///
/// Implementations return every error they find; `Ok(None)` means the data
/// conforms.
pub trait Evaluate: Send + Sync {
    fn evaluate(
        &self,
        rules: &RuleSet,
        data: &Value,
    ) -> Result<Option<Vec<FieldError>>, ValidationError>;
}

/// Kind registry plus the recursive evaluation walk.
#[derive(Clone)]
pub struct Evaluator {
    kinds: HashMap<String, KindFn>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// An evaluator with no kinds at all.
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// An evaluator with the built-in kinds (`int`, `string`, `array`, ...).
    pub fn new() -> Self {
        let mut evaluator = Self::empty();
        crate::rules::register_builtins(&mut evaluator);
        evaluator
    }

    /// Built-ins plus every array alias token and `idCard`.
    pub fn standard() -> Self {
        let mut evaluator = Self::new();
        crate::alias::register_array_kinds(&mut evaluator);
        crate::id_card::register(&mut evaluator);
        evaluator
    }

    /// Register a kind under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, kind: F)
    where
        F: Fn(&Check<'_>) -> KindResult + Send + Sync + 'static,
    {
        let name = name.into();
        if self.kinds.contains_key(&name) {
            trace_warn!(kind = %name, "replacing registered constraint kind");
        }
        self.kinds.insert(name, Arc::new(kind));
    }

    /// Register a kind that only needs the constraint and the value.
    ///
    /// The function returns the failure message, or `None` when the value
    /// passes.
    pub fn register_simple<F>(&mut self, name: impl Into<String>, check: F)
    where
        F: Fn(&Constraint, &Value) -> Option<String> + Send + Sync + 'static,
    {
        self.register(name, move |c: &Check<'_>| {
            Ok(check(c.constraint, c.value).map(Violation::Message))
        });
    }

    pub fn has_kind(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Registered kind names, sorted.
    pub fn kind_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the kind named `kind` for `check`.
    ///
    /// A literal registration wins; otherwise a trailing `?` is dropped
    /// before the lookup.
    pub fn dispatch(&self, kind: &str, check: &Check<'_>) -> KindResult {
        let run = self
            .kinds
            .get(kind)
            .or_else(|| kind.strip_suffix('?').and_then(|base| self.kinds.get(base)))
            .ok_or_else(|| ValidationError::UnknownType {
                found: kind.to_string(),
                known: self.kind_names().join(", "),
            })?;
        run(check)
    }
}

impl Evaluate for Evaluator {
    fn evaluate(
        &self,
        rules: &RuleSet,
        data: &Value,
    ) -> Result<Option<Vec<FieldError>>, ValidationError> {
        let record = data.as_object().ok_or_else(|| {
            ValidationError::InvalidInput("need object type param for validate".to_string())
        })?;

        let mut errors = Vec::new();
        for (field, constraint) in rules.iter() {
            // A constraint without a type imposes nothing.
            let Some(kind) = constraint.kind() else {
                continue;
            };

            let value = match record.get(field) {
                Some(value) if !value.is_null() => value,
                _ => {
                    if constraint.is_required() {
                        errors.push(FieldError::missing(field));
                    }
                    continue;
                }
            };

            let check = Check {
                evaluator: self,
                constraint,
                value,
                parent: data,
                field,
            };
            match self.dispatch(kind, &check)? {
                None => {}
                Some(Violation::Message(message)) => {
                    errors.push(FieldError::invalid(field, message));
                }
                Some(Violation::Nested(nested)) => {
                    errors.extend(nested.into_iter().map(|e| e.under(field)));
                }
            }
        }

        if errors.is_empty() {
            Ok(None)
        } else {
            Ok(Some(errors))
        }
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("kinds", &self.kind_names())
            .finish()
    }
}
