//! # fieldrule
//!
//! Declarative field validation for JSON records. Rules are written with
//! short tokens (`"string?"`, `"int[]+"`, `"idCard"`) that expand into
//! constraints; a [`Validator`] checks a record field by field and reports
//! at most one error per call.
//!
//! ## Example
//!
//! ```rust
//! use fieldrule::prelude::*;
//! use serde_json::json;
//!
//! let rules = RuleSet::new()
//!     .field("name", resolve_alias("string", Constraint::new()))
//!     .field("tags", resolve_alias("string[]+", Constraint::new()))
//!     .field("idCard", resolve_alias("idCard", Constraint::new()))
//!     .field("role", enum_rule(["admin", "user"], Constraint::new()));
//!
//! let record = json!({
//!     "name": "Li Lei",
//!     "tags": ["a"],
//!     "idCard": "11010519491231002X",
//!     "role": "root",
//! });
//!
//! let err = validator().validate(&rules, &record).unwrap_err();
//! assert_eq!(err.to_string(), "[invalid] field:role should be one of admin, user");
//! ```
//!
//! ## Rule Tokens
//!
//! - `int`, `int?`, `integer`, `number` - numbers, with `min`/`max`
//! - `string`, `string?`, `email`, `password`, `id`, `date`, `dateTime`
//! - `boolean`, `bool`, `object`, `array`, `enum`
//! - `T[]`, `T[]+`, `T[]?`, `T[]+?` for `string`, `number`, `int`,
//!   `integer`, `object`, `obj`, plus `array+`, `array+?`, `[]+`
//! - `idCard` - 18-digit resident identity number with region and
//!   checksum validation
//!
//! ## Error Format
//!
//! The first failing field is reported as
//! `[{code}] field:{path} {message}`, e.g.
//! `[missing_field] field:address.city required`, unless the field's
//! constraint carries its own `message`.

pub mod alias;
pub mod constraint;
mod error;
pub mod evaluator;
pub mod id_card;
pub mod rules;
mod tracing_macros;
mod validator;


pub use alias::{array_rule, enum_rule, object_rule, resolve_alias};
pub use constraint::{Constraint, RuleSet};
pub use error::{
    FieldError, IdCardError, ValidationError, Violation, CODE_INVALID, CODE_MISSING_FIELD,
};
pub use evaluator::{Check, Evaluate, Evaluator, KindResult};
pub use id_card::validate_id_card;
pub use validator::{validator, ErrorHandler, FailFast, ReturnMessage, Validator};

/// Prelude module for validation
pub mod prelude {
    pub use crate::alias::{array_rule, enum_rule, object_rule, resolve_alias};
    pub use crate::constraint::{Constraint, RuleSet};
    pub use crate::error::{FieldError, IdCardError, ValidationError};
    pub use crate::evaluator::{Evaluate, Evaluator};
    pub use crate::validator::{validator, ErrorHandler, FailFast, ReturnMessage, Validator};
}
