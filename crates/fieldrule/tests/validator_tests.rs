//! Integration tests for rule tokens, the evaluator and the validator facade.
//!
//! These drive the public API the way callers do: build a rule set from
//! alias tokens and builders, then validate JSON records.

use fieldrule::prelude::*;
use fieldrule::{CODE_INVALID, CODE_MISSING_FIELD};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

fn rule(token: &str) -> Constraint {
    resolve_alias(token, Constraint::new())
}

fn first_message(rules: &RuleSet, data: &Value) -> Option<String> {
    Validator::new()
        .configure(ReturnMessage)
        .validate(rules, data)
        .unwrap()
}

fn signup_rules() -> RuleSet {
    RuleSet::new()
        .field("username", rule("string"))
        .field("email", rule("email"))
        .field("password", rule("password"))
        .field(
            "confirm",
            resolve_alias("password", Constraint::new().with("compare", "password")),
        )
        .field("nickname", rule("string?"))
        .field("age", rule("int?"))
        .field("tags", rule("string[]?"))
}

#[test]
fn valid_signup_passes() {
    let data = json!({
        "username": "lilei",
        "email": "lilei@example.com",
        "password": "s3cret!!",
        "confirm": "s3cret!!",
        "nickname": "",
    });
    assert_eq!(first_message(&signup_rules(), &data), None);
}

#[test]
fn missing_required_field_is_reported() {
    let data = json!({ "email": "lilei@example.com" });
    assert_eq!(
        first_message(&signup_rules(), &data).as_deref(),
        Some("[missing_field] field:username required")
    );
}

#[test]
fn empty_required_string_is_reported() {
    let data = json!({ "username": "", "email": "x" });
    assert_eq!(
        first_message(&signup_rules(), &data).as_deref(),
        Some("[invalid] field:username should not be empty")
    );
}

#[test]
fn password_confirmation_must_match() {
    let data = json!({
        "username": "lilei",
        "email": "lilei@example.com",
        "password": "s3cret!!",
        "confirm": "s3cret??",
    });
    assert_eq!(
        first_message(&signup_rules(), &data).as_deref(),
        Some("[invalid] field:confirm should equal to password")
    );
}

#[test]
fn optional_fields_still_check_shape() {
    let data = json!({
        "username": "lilei",
        "email": "lilei@example.com",
        "password": "s3cret!!",
        "confirm": "s3cret!!",
        "age": "twenty",
    });
    assert_eq!(
        first_message(&signup_rules(), &data).as_deref(),
        Some("[invalid] field:age should be an integer")
    );
}

#[test]
fn default_handler_escalates() {
    let err = validator()
        .validate(&signup_rules(), &json!({}))
        .unwrap_err();
    assert_eq!(err.rejection(), Some("[missing_field] field:username required"));
}

#[test]
fn only_first_failing_field_reaches_handler() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let v = Validator::new().configure(move |message: String| {
        sink.lock().unwrap().push(message);
        Ok::<_, ValidationError>(())
    });

    let rules = RuleSet::new()
        .field("a", rule("int"))
        .field("b", rule("int"))
        .field("c", rule("int"));
    let out = v.validate(&rules, &json!({ "a": 1, "b": "x", "c": "y" })).unwrap();

    assert_eq!(out, Some(()));
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["[invalid] field:b should be an integer".to_string()]
    );
}

#[test]
fn evaluator_reports_all_errors_for_callers_that_want_them() {
    let rules = RuleSet::new()
        .field("a", rule("int"))
        .field("b", rule("int"));
    let errors = Evaluator::standard()
        .evaluate(&rules, &json!({ "b": "x" }))
        .unwrap()
        .unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].code, CODE_MISSING_FIELD);
    assert_eq!(errors[1].code, CODE_INVALID);
}

#[test]
fn custom_message_wins() {
    let rules = RuleSet::new().field(
        "phone",
        resolve_alias("id", Constraint::new().with("message", "phone must be digits")),
    );
    assert_eq!(
        first_message(&rules, &json!({ "phone": "555-1234" })).as_deref(),
        Some("phone must be digits")
    );
}

#[test]
fn array_token_used_directly_as_type() {
    let rules = RuleSet::from(json!({ "tags": "string[]+" }));
    assert_eq!(first_message(&rules, &json!({ "tags": ["a", "b"] })), None);
    assert_eq!(
        first_message(&rules, &json!({ "tags": [] })).as_deref(),
        Some("[invalid] field:tags length should bigger than 1")
    );
    assert_eq!(
        first_message(&rules, &json!({ "tags": ["a", 2] })).as_deref(),
        Some("[invalid] field:tags[1] should be a string")
    );
    assert_eq!(
        first_message(&rules, &json!({})).as_deref(),
        Some("[missing_field] field:tags required")
    );
}

#[test]
fn optional_array_token_as_type() {
    let rules = RuleSet::from(json!({ "ids": "int[]+?" }));
    assert_eq!(first_message(&rules, &json!({})), None);
    assert_eq!(
        first_message(&rules, &json!({ "ids": [] })).as_deref(),
        Some("[invalid] field:ids length should bigger than 1")
    );
}

#[test]
fn array_token_type_takes_field_attributes() {
    let rules = RuleSet::from(json!({
        "lines": {
            "type": "object[]+",
            "max": 2,
            "rule": { "sku": "string", "qty": "int" }
        }
    }));
    assert_eq!(
        first_message(&rules, &json!({ "lines": [{ "sku": "a", "qty": 1 }] })),
        None
    );
    assert_eq!(
        first_message(&rules, &json!({ "lines": [{ "sku": "a", "qty": "1" }] })).as_deref(),
        Some("[invalid] field:lines[0].qty should be an integer")
    );
    let three = json!({ "lines": [{ "sku": "a", "qty": 1 }, { "sku": "b", "qty": 1 }, { "sku": "c", "qty": 1 }] });
    assert_eq!(
        first_message(&rules, &three).as_deref(),
        Some("[invalid] field:lines length should smaller than 2")
    );
}

#[test]
fn resolved_array_alias_validates_items() {
    let rules = RuleSet::new().field("scores", rule("number[]"));
    assert_eq!(
        first_message(&rules, &json!({ "scores": [1, 2.5, "3"] })).as_deref(),
        Some("[invalid] field:scores[2] should be a number")
    );
}

#[test]
fn integer_array_alias_checks_ints() {
    let rules = RuleSet::new().field("ids", rule("integer[]"));
    assert_eq!(
        first_message(&rules, &json!({ "ids": [1, 1.5] })).as_deref(),
        Some("[invalid] field:ids[1] should be an integer")
    );
}

#[test]
fn id_card_field() {
    let rules = RuleSet::new().field("idCard", rule("idCard"));
    assert_eq!(first_message(&rules, &json!({ "idCard": "11010519491231002X" })), None);
    assert_eq!(
        first_message(&rules, &json!({ "idCard": "110105194912310021" })).as_deref(),
        Some("[invalid] field:idCard idCard verify bit error")
    );
    assert_eq!(
        first_message(&rules, &json!({ "idCard": "990105194912310020" })).as_deref(),
        Some("[invalid] field:idCard idCard address code error")
    );
    assert_eq!(
        first_message(&rules, &json!({ "idCard": "110105491231002" })).as_deref(),
        Some("[invalid] field:idCard idCard format error")
    );
    assert_eq!(
        first_message(&rules, &json!({ "idCard": 110105 })).as_deref(),
        Some("[invalid] field:idCard idCard format error")
    );
}

#[test]
fn builders_compose_nested_shapes() {
    let address = RuleSet::new()
        .field("city", rule("string"))
        .field("zip", rule("id"));
    let rules = RuleSet::new()
        .field("role", enum_rule(["admin", "user"], Constraint::new()))
        .field("address", object_rule(address.clone(), Constraint::new()))
        .field(
            "contacts",
            array_rule("object", Value::from(address), Constraint::new()),
        );

    let good = json!({
        "role": "user",
        "address": { "city": "Beijing", "zip": "100000" },
        "contacts": [{ "city": "Shanghai", "zip": "200000" }],
    });
    assert_eq!(first_message(&rules, &good), None);

    let bad = json!({
        "role": "user",
        "address": { "city": "Beijing", "zip": "100000" },
        "contacts": [{ "city": "Shanghai", "zip": "20-0000" }],
    });
    assert_eq!(
        first_message(&rules, &bad).as_deref(),
        Some(r"[invalid] field:contacts[0].zip should match /^\d+$/")
    );
}

#[test]
fn unknown_token_constraint_always_passes() {
    let rules = RuleSet::new()
        .field("typo", rule("strnig"))
        .field("ok", rule("bool"));
    assert_eq!(first_message(&rules, &json!({ "ok": true })), None);
}

#[test]
fn date_and_datetime_tokens() {
    let rules = RuleSet::new()
        .field("day", rule("date"))
        .field("at", rule("dateTime"));
    assert_eq!(
        first_message(&rules, &json!({ "day": "2024-01-31", "at": "2024-01-31 12:00:00" })),
        None
    );
    assert_eq!(
        first_message(&rules, &json!({ "day": "2024-01-31", "at": "2024-01-31" })).as_deref(),
        Some(r"[invalid] field:at should match /^\d{4}\-\d{2}\-\d{2} \d{2}:\d{2}:\d{2}$/")
    );
}

#[test]
fn rule_set_deserializes_from_json_config() {
    let rules: RuleSet = serde_json::from_str(
        r#"{ "name": "string", "age": { "type": "int", "min": 18 }, "size": ["s", "m", "l"] }"#,
    )
    .unwrap();
    assert_eq!(
        first_message(&rules, &json!({ "name": "x", "age": 17, "size": "s" })).as_deref(),
        Some("[invalid] field:age should bigger than 18")
    );
    assert_eq!(
        first_message(&rules, &json!({ "name": "x", "age": 18, "size": "xl" })).as_deref(),
        Some("[invalid] field:size should be one of s, m, l")
    );
}

#[test]
fn custom_evaluator_kind_through_facade() {
    let mut evaluator = Evaluator::standard();
    evaluator.register_simple("slug", |_, value| match value.as_str() {
        Some(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_lowercase() || c == '-') => None,
        _ => Some("should be a slug".to_string()),
    });
    let v = Validator::with_evaluator(evaluator).configure(ReturnMessage);
    let rules = RuleSet::from(json!({ "slug": "slug" }));
    assert_eq!(v.validate(&rules, &json!({ "slug": "hello-world" })).unwrap(), None);
    assert_eq!(
        v.validate(&rules, &json!({ "slug": "Hello" })).unwrap().as_deref(),
        Some("[invalid] field:slug should be a slug")
    );
}
