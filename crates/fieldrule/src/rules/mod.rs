//! Built-in constraint kinds.
//!
//! Scalar kinds check a single JSON value; composite kinds (`enum`,
//! `object`, `array`) may recurse through the evaluator.

mod composite;
mod scalar;

pub use composite::{check_array, check_enum, check_object};
pub use scalar::{check_number, check_string};

use crate::evaluator::Evaluator;

/// Register every built-in kind with `evaluator`.
pub(crate) fn register_builtins(evaluator: &mut Evaluator) {
    evaluator.register("int", scalar::check_int);
    evaluator.register("integer", scalar::check_int);
    evaluator.register("number", scalar::check_number);
    evaluator.register("string", scalar::check_string);
    evaluator.register("id", scalar::check_id);
    evaluator.register("date", scalar::check_date);
    evaluator.register("dateTime", scalar::check_date_time);
    evaluator.register("boolean", scalar::check_boolean);
    evaluator.register("bool", scalar::check_boolean);
    evaluator.register("email", scalar::check_email);
    evaluator.register("password", scalar::check_password);
    evaluator.register("url", scalar::check_url);
    evaluator.register("enum", composite::check_enum);
    evaluator.register("object", composite::check_object);
    evaluator.register("array", composite::check_array);
}

/// Render a JSON value the way messages show it: strings without quotes.
pub(crate) fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
