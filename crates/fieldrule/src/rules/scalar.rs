//! Scalar kinds: numbers, booleans and the string family.

use super::display_value;
use crate::constraint::attr;
use crate::error::Violation;
use crate::evaluator::{Check, KindResult};
use regex::Regex;
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

// Pre-compiled regex patterns
static ID_REGEX: OnceLock<Regex> = OnceLock::new();
static DATE_REGEX: OnceLock<Regex> = OnceLock::new();
static DATE_TIME_REGEX: OnceLock<Regex> = OnceLock::new();
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_REGEX: OnceLock<Regex> = OnceLock::new();

// `format` patterns from rule sets, compiled on first use
static FORMAT_REGEXES: OnceLock<RwLock<HashMap<String, Regex>>> = OnceLock::new();

fn id_regex() -> &'static Regex {
    ID_REGEX.get_or_init(|| Regex::new(r"^[0-9]+$").unwrap())
}

fn date_regex() -> &'static Regex {
    DATE_REGEX.get_or_init(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap())
}

fn date_time_regex() -> &'static Regex {
    DATE_TIME_REGEX.get_or_init(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}$").unwrap()
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(
            r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$",
        )
        .unwrap()
    })
}

fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| Regex::new(r"^(https?|ftp)://[^\s/$.?#].[^\s]*$").unwrap())
}

/// Compiled regex for a `format` attribute. Invalid patterns are not cached.
fn format_regex(format: &str) -> Result<Regex, regex::Error> {
    let cache = FORMAT_REGEXES.get_or_init(Default::default);
    if let Some(pattern) = cache.read().ok().and_then(|map| map.get(format).cloned()) {
        return Ok(pattern);
    }
    let pattern = Regex::new(format)?;
    if let Ok(mut map) = cache.write() {
        map.insert(format.to_string(), pattern.clone());
    }
    Ok(pattern)
}

const ID_PATTERN: &str = r"/^\d+$/";
const DATE_PATTERN: &str = r"/^\d{4}\-\d{2}\-\d{2}$/";
const DATE_TIME_PATTERN: &str = r"/^\d{4}\-\d{2}\-\d{2} \d{2}:\d{2}:\d{2}$/";

/// Text checks shared by `string` and the kinds derived from it.
struct TextRule {
    allow_empty: bool,
    min: Option<Value>,
    max: Option<Value>,
}

impl TextRule {
    /// First violation for `value`, or `Ok(text)` when the remaining
    /// pattern checks should run. An allowed empty string passes outright.
    fn apply<'v>(&self, value: &'v Value) -> Result<Option<&'v str>, Violation> {
        let Some(text) = value.as_str() else {
            return Err(Violation::message("should be a string"));
        };
        if text.is_empty() {
            return if self.allow_empty {
                Ok(None)
            } else {
                Err(Violation::message("should not be empty"))
            };
        }

        let len = text.chars().count() as f64;
        if let Some(max) = &self.max {
            if max.as_f64().is_some_and(|max| len > max) {
                return Err(Violation::Message(format!(
                    "length should smaller than {}",
                    display_value(max)
                )));
            }
        }
        if let Some(min) = &self.min {
            if min.as_f64().is_some_and(|min| len < min) {
                return Err(Violation::Message(format!(
                    "length should bigger than {}",
                    display_value(min)
                )));
            }
        }
        Ok(Some(text))
    }
}

/// Run `rule`, then `pattern` on the surviving text.
fn text_with_pattern(
    value: &Value,
    rule: TextRule,
    pattern: &Regex,
    message: String,
) -> KindResult {
    match rule.apply(value) {
        Err(violation) => Ok(Some(violation)),
        Ok(Some(text)) if !pattern.is_match(text) => Ok(Some(Violation::Message(message))),
        Ok(_) => Ok(None),
    }
}

fn is_integral(n: &Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
}

/// `min`/`max` bounds for numeric kinds.
fn check_bounds(check: &Check<'_>, n: &Number) -> KindResult {
    let Some(actual) = n.as_f64() else {
        return Ok(None);
    };
    if let Some(max) = check.constraint.max() {
        if max.as_f64().is_some_and(|max| actual > max) {
            return Ok(Some(Violation::Message(format!(
                "should smaller than {}",
                display_value(max)
            ))));
        }
    }
    if let Some(min) = check.constraint.min() {
        if min.as_f64().is_some_and(|min| actual < min) {
            return Ok(Some(Violation::Message(format!(
                "should bigger than {}",
                display_value(min)
            ))));
        }
    }
    Ok(None)
}

pub(crate) fn check_int(check: &Check<'_>) -> KindResult {
    match check.value {
        Value::Number(n) if is_integral(n) => check_bounds(check, n),
        _ => Ok(Some(Violation::message("should be an integer"))),
    }
}

/// Any JSON number, with optional `min`/`max`.
pub fn check_number(check: &Check<'_>) -> KindResult {
    match check.value {
        Value::Number(n) => check_bounds(check, n),
        _ => Ok(Some(Violation::message("should be a number"))),
    }
}

pub(crate) fn check_boolean(check: &Check<'_>) -> KindResult {
    if check.value.is_boolean() {
        Ok(None)
    } else {
        Ok(Some(Violation::message("should be a boolean")))
    }
}

/// Strings with `allowEmpty`, `min`/`max` length and an optional `format`
/// regex.
pub fn check_string(check: &Check<'_>) -> KindResult {
    let c = check.constraint;
    let rule = TextRule {
        allow_empty: c.allows_empty(),
        min: c.min().cloned(),
        max: c.max().cloned(),
    };
    let text = match rule.apply(check.value) {
        Err(violation) => return Ok(Some(violation)),
        Ok(None) => return Ok(None),
        Ok(Some(text)) => text,
    };

    let Some(format) = c.format() else {
        return Ok(None);
    };
    let pattern = format_regex(format)
        .map_err(|e| check.invalid_rule(format!("invalid format pattern `{format}`: {e}")))?;
    if pattern.is_match(text) {
        Ok(None)
    } else {
        let message = c
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| format!("should match /{format}/"));
        Ok(Some(Violation::Message(message)))
    }
}

/// Derived kinds only honor an explicit `allowEmpty: true`.
fn explicit_empty(check: &Check<'_>) -> TextRule {
    TextRule {
        allow_empty: check
            .constraint
            .get(attr::ALLOW_EMPTY)
            .and_then(Value::as_bool)
            .unwrap_or(false),
        min: None,
        max: None,
    }
}

pub(crate) fn check_id(check: &Check<'_>) -> KindResult {
    text_with_pattern(
        check.value,
        explicit_empty(check),
        id_regex(),
        format!("should match {ID_PATTERN}"),
    )
}

pub(crate) fn check_date(check: &Check<'_>) -> KindResult {
    text_with_pattern(
        check.value,
        explicit_empty(check),
        date_regex(),
        format!("should match {DATE_PATTERN}"),
    )
}

pub(crate) fn check_date_time(check: &Check<'_>) -> KindResult {
    text_with_pattern(
        check.value,
        explicit_empty(check),
        date_time_regex(),
        format!("should match {DATE_TIME_PATTERN}"),
    )
}

pub(crate) fn check_email(check: &Check<'_>) -> KindResult {
    let message = check
        .constraint
        .message()
        .unwrap_or("should be an email")
        .to_string();
    text_with_pattern(check.value, explicit_empty(check), email_regex(), message)
}

pub(crate) fn check_url(check: &Check<'_>) -> KindResult {
    let message = check
        .constraint
        .message()
        .unwrap_or("should be a url")
        .to_string();
    text_with_pattern(check.value, explicit_empty(check), url_regex(), message)
}

const DEFAULT_PASSWORD_MIN: u64 = 6;

/// Text rules with a minimum length of 6 unless `min` says otherwise, then
/// equality with the sibling field named by `compare`.
pub(crate) fn check_password(check: &Check<'_>) -> KindResult {
    let c = check.constraint;
    let rule = TextRule {
        min: Some(c.min().cloned().unwrap_or(Value::from(DEFAULT_PASSWORD_MIN))),
        max: c.max().cloned(),
        ..explicit_empty(check)
    };
    if let Err(violation) = rule.apply(check.value) {
        return Ok(Some(violation));
    }

    let Some(other) = c.compare() else {
        return Ok(None);
    };
    if check.parent.get(other) == Some(check.value) {
        Ok(None)
    } else {
        Ok(Some(Violation::Message(format!("should equal to {other}"))))
    }
}
