//! Composite kinds: `enum`, `object` and `array`.

use super::display_value;
use crate::constraint::{Constraint, RuleSet};
use crate::error::{FieldError, Violation};
use crate::evaluator::{Check, Evaluate, KindResult};
use serde_json::Value;

/// Membership in the constraint's `values`.
pub fn check_enum(check: &Check<'_>) -> KindResult {
    let values = check
        .constraint
        .values()
        .ok_or_else(|| check.invalid_rule("check enum need array type values"))?;
    if values.contains(check.value) {
        return Ok(None);
    }
    let listed: Vec<String> = values.iter().map(display_value).collect();
    Ok(Some(Violation::Message(format!(
        "should be one of {}",
        listed.join(", ")
    ))))
}

/// A JSON object, validated against the nested `rule` when one is given.
pub fn check_object(check: &Check<'_>) -> KindResult {
    if !check.value.is_object() {
        return Ok(Some(Violation::message("should be an object")));
    }
    let Some(rule) = check.constraint.rule() else {
        return Ok(None);
    };
    if !rule.is_object() {
        return Err(check.invalid_rule("check object need object type rule"));
    }
    let nested = RuleSet::from(rule);
    Ok(check
        .evaluator
        .evaluate(&nested, check.value)?
        .map(Violation::Nested))
}

/// A JSON array with `min`/`max` length, each item checked by `itemType`.
///
/// Object items are validated with this constraint's `rule` as their
/// nested rule set; other items use `rule` as their own constraint.
pub fn check_array(check: &Check<'_>) -> KindResult {
    let Some(items) = check.value.as_array() else {
        return Ok(Some(Violation::message("should be an array")));
    };

    let c = check.constraint;
    let len = items.len() as f64;
    if let Some(max) = c.max() {
        if max.as_f64().is_some_and(|max| len > max) {
            return Ok(Some(Violation::Message(format!(
                "length should smaller than {}",
                display_value(max)
            ))));
        }
    }
    if let Some(min) = c.min() {
        if min.as_f64().is_some_and(|min| len < min) {
            return Ok(Some(Violation::Message(format!(
                "length should bigger than {}",
                display_value(min)
            ))));
        }
    }

    let Some(item_type) = c.item_type() else {
        return Ok(None);
    };
    let item_constraint = if item_type == "object" {
        c.clone()
    } else {
        c.rule().cloned().map(Constraint::from).unwrap_or_default()
    };

    let mut errors = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let index = format!("[{i}]");
        let item_check = check.nested(&item_constraint, item, check.value, &index);
        match check.evaluator.dispatch(item_type, &item_check)? {
            None => {}
            Some(Violation::Message(message)) => errors.push(FieldError::invalid(&index, message)),
            Some(Violation::Nested(nested)) => {
                errors.extend(nested.into_iter().map(|e| e.under(&index)));
            }
        }
    }

    if errors.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Violation::Nested(errors)))
    }
}

#[cfg(test)]
mod tests {
    use crate::constraint::RuleSet;
    use crate::error::{FieldError, ValidationError};
    use crate::evaluator::{Evaluate, Evaluator};
    use serde_json::{json, Value};

    fn errors(rules: Value, data: Value) -> Vec<FieldError> {
        Evaluator::new()
            .evaluate(&RuleSet::from(rules), &data)
            .unwrap()
            .unwrap_or_default()
    }

    #[test]
    fn enum_membership() {
        let rules = json!({ "role": { "type": "enum", "values": ["admin", "user", 3] } });
        assert!(errors(rules.clone(), json!({ "role": "admin" })).is_empty());
        assert!(errors(rules.clone(), json!({ "role": 3 })).is_empty());
        assert_eq!(
            errors(rules, json!({ "role": "root" })),
            vec![FieldError::invalid("role", "should be one of admin, user, 3")]
        );
    }

    #[test]
    fn enum_shorthand() {
        let rules = json!({ "size": ["s", "m"] });
        assert_eq!(errors(rules, json!({ "size": "xl" }))[0].message, "should be one of s, m");
    }

    #[test]
    fn enum_without_values_is_rule_error() {
        let err = Evaluator::new()
            .evaluate(&RuleSet::from(json!({ "e": "enum" })), &json!({ "e": 1 }))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRule { ref field, .. } if field == "e"));
    }

    #[test]
    fn object_type_check() {
        let rules = json!({ "meta": "object" });
        assert!(errors(rules.clone(), json!({ "meta": {} })).is_empty());
        assert_eq!(errors(rules, json!({ "meta": [] }))[0].message, "should be an object");
    }

    #[test]
    fn object_rule_must_be_an_object() {
        let err = Evaluator::new()
            .evaluate(
                &RuleSet::from(json!({ "meta": { "type": "object", "rule": "x" } })),
                &json!({ "meta": {} }),
            )
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRule { ref field, .. } if field == "meta"));
    }

    #[test]
    fn nested_object_paths_use_dots() {
        let rules = json!({
            "address": {
                "type": "object",
                "rule": { "city": "string", "geo": { "type": "object", "rule": { "lat": "number" } } }
            }
        });
        let data = json!({ "address": { "geo": { "lat": "north" } } });
        assert_eq!(
            errors(rules, data),
            vec![
                FieldError::missing("address.city"),
                FieldError::invalid("address.geo.lat", "should be a number"),
            ]
        );
    }

    #[test]
    fn array_length_bounds() {
        let rules = json!({ "tags": { "type": "array", "min": 1, "max": 2 } });
        assert!(errors(rules.clone(), json!({ "tags": ["a"] })).is_empty());
        assert_eq!(
            errors(rules.clone(), json!({ "tags": [] }))[0].message,
            "length should bigger than 1"
        );
        assert_eq!(
            errors(rules, json!({ "tags": [1, 2, 3] }))[0].message,
            "length should smaller than 2"
        );
    }

    #[test]
    fn array_rejects_non_arrays() {
        let rules = json!({ "tags": "array" });
        assert_eq!(errors(rules, json!({ "tags": "a,b" }))[0].message, "should be an array");
    }

    #[test]
    fn array_item_paths_use_brackets() {
        let rules = json!({ "ids": { "type": "array", "itemType": "int" } });
        assert_eq!(
            errors(rules, json!({ "ids": [1, "two", 3, 4.5] })),
            vec![
                FieldError::invalid("ids[1]", "should be an integer"),
                FieldError::invalid("ids[3]", "should be an integer"),
            ]
        );
    }

    #[test]
    fn array_item_rule_applies_to_scalars() {
        let rules = json!({
            "names": { "type": "array", "itemType": "string", "rule": { "max": 3 } }
        });
        assert_eq!(
            errors(rules, json!({ "names": ["abc", "abcd"] })),
            vec![FieldError::invalid("names[1]", "length should smaller than 3")]
        );
    }

    #[test]
    fn array_of_objects_uses_nested_rule() {
        let rules = json!({
            "items": {
                "type": "array",
                "itemType": "object",
                "rule": { "name": "string", "qty": { "type": "int", "min": 1 } }
            }
        });
        let data = json!({ "items": [{ "name": "a", "qty": 1 }, { "qty": 0 }, 7] });
        assert_eq!(
            errors(rules, data),
            vec![
                FieldError::missing("items[1].name"),
                FieldError::invalid("items[1].qty", "should bigger than 1"),
                FieldError::invalid("items[2]", "should be an object"),
            ]
        );
    }

    #[test]
    fn nested_arrays_of_arrays() {
        let rules = json!({
            "grid": { "type": "array", "itemType": "array", "rule": { "itemType": "int" } }
        });
        assert_eq!(
            errors(rules, json!({ "grid": [[1, 2], [3, "x"]] })),
            vec![FieldError::invalid("grid[1][1]", "should be an integer")]
        );
    }

    #[test]
    fn unknown_item_type_is_rule_error() {
        let err = Evaluator::new()
            .evaluate(
                &RuleSet::from(json!({ "xs": { "type": "array", "itemType": "nope" } })),
                &json!({ "xs": [1] }),
            )
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnknownType { .. }));
    }
}
