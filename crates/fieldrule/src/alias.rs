//! Rule alias tables and rule builders.
//!
//! A rule token such as `"string?"` or `"int[]+"` names a complete
//! constraint. The vocabulary is fixed: a base table for scalar shapes, an
//! array table for list shapes, and `idCard`.
//!
//! ```rust
//! use fieldrule::{resolve_alias, Constraint};
//!
//! let rule = resolve_alias("string[]+", Constraint::new().with("message", "tags required"));
//! assert_eq!(rule.kind(), Some("array"));
//! assert_eq!(rule.item_type(), Some("string"));
//! assert_eq!(rule.message(), Some("tags required"));
//! ```

use crate::constraint::{attr, Constraint, RuleSet};
use crate::evaluator::{Check, Evaluator};
use crate::id_card;
use crate::rules::check_array;
use crate::tracing_macros::trace_debug;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

/// One row of the base table.
struct BaseAlias {
    kind: &'static str,
    required: Option<bool>,
    allow_empty: Option<bool>,
    min: Option<u64>,
}

impl BaseAlias {
    const fn new(kind: &'static str) -> Self {
        Self {
            kind,
            required: None,
            allow_empty: None,
            min: None,
        }
    }

    const fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    const fn allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = Some(allow_empty);
        self
    }

    const fn min(mut self, min: u64) -> Self {
        self.min = Some(min);
        self
    }

    fn expand(&self) -> Constraint {
        let mut c = Constraint::of_type(self.kind);
        if let Some(required) = self.required {
            c.insert(attr::REQUIRED, required);
        }
        if let Some(allow_empty) = self.allow_empty {
            c.insert(attr::ALLOW_EMPTY, allow_empty);
        }
        if let Some(min) = self.min {
            c.insert(attr::MIN, min);
        }
        c
    }
}

const BASE_ALIASES: &[(&str, BaseAlias)] = &[
    ("int", BaseAlias::new("int").required(true)),
    ("int?", BaseAlias::new("int").required(false)),
    ("integer", BaseAlias::new("integer").required(true)),
    ("number", BaseAlias::new("number").required(true)),
    ("date", BaseAlias::new("date").required(true)),
    ("dateTime", BaseAlias::new("dateTime").required(true)),
    ("id", BaseAlias::new("id").required(true)),
    ("boolean", BaseAlias::new("boolean").required(true)),
    ("bool", BaseAlias::new("bool").required(true)),
    ("string", BaseAlias::new("string").required(true).allow_empty(false)),
    ("string?", BaseAlias::new("string").required(false).allow_empty(true)),
    ("email", BaseAlias::new("email").required(true).allow_empty(false)),
    (
        "password",
        BaseAlias::new("password").required(true).allow_empty(false).min(6),
    ),
    ("object", BaseAlias::new("object").required(true)),
    ("array", BaseAlias::new("array").required(true)),
    ("enum", BaseAlias::new("enum")),
];

/// One row of the array table.
struct ArrayAlias {
    item_type: Option<&'static str>,
    require: bool,
    non_empty: bool,
}

impl ArrayAlias {
    fn expand(&self) -> Constraint {
        let mut c = Constraint::of_type("array");
        if let Some(item_type) = self.item_type {
            c.insert(attr::ITEM_TYPE, item_type);
        }
        c.insert(attr::REQUIRE, self.require);
        if self.non_empty {
            c.insert(attr::MIN, 1);
        }
        c
    }
}

const fn arr(item_type: Option<&'static str>, require: bool, non_empty: bool) -> ArrayAlias {
    ArrayAlias {
        item_type,
        require,
        non_empty,
    }
}

const STRING: Option<&str> = Some("string");
const NUMBER: Option<&str> = Some("number");
const INT: Option<&str> = Some("int");
const OBJECT: Option<&str> = Some("object");

// `[]]+?` keeps its historical spelling; `[]+?` was never a token.
const ARRAY_ALIASES: &[(&str, ArrayAlias)] = &[
    ("array+", arr(None, true, true)),
    ("array+?", arr(None, false, true)),
    ("[]+", arr(None, true, true)),
    ("[]]+?", arr(None, false, true)),
    ("string[]", arr(STRING, true, false)),
    ("string[]+", arr(STRING, true, true)),
    ("string[]?", arr(STRING, false, false)),
    ("string[]+?", arr(STRING, false, true)),
    ("number[]", arr(NUMBER, true, false)),
    ("number[]+", arr(NUMBER, true, true)),
    ("number[]?", arr(NUMBER, false, false)),
    ("number[]+?", arr(NUMBER, false, true)),
    ("int[]", arr(INT, true, false)),
    ("int[]+", arr(INT, true, true)),
    ("int[]?", arr(INT, false, false)),
    ("int[]+?", arr(INT, false, true)),
    ("integer[]", arr(INT, true, false)),
    ("integer[]+", arr(INT, true, true)),
    ("integer[]?", arr(INT, false, false)),
    ("integer[]+?", arr(INT, false, true)),
    ("object[]", arr(OBJECT, true, false)),
    ("object[]+", arr(OBJECT, true, true)),
    ("object[]?", arr(OBJECT, false, false)),
    ("object[]+?", arr(OBJECT, false, true)),
    ("obj[]", arr(OBJECT, true, false)),
    ("obj[]+", arr(OBJECT, true, true)),
    ("obj[]?", arr(OBJECT, false, false)),
    ("obj[]+?", arr(OBJECT, false, true)),
];

type AliasIndex = HashMap<&'static str, Constraint>;

static BASE_INDEX: OnceLock<AliasIndex> = OnceLock::new();
static ARRAY_INDEX: OnceLock<AliasIndex> = OnceLock::new();

fn base_index() -> &'static AliasIndex {
    BASE_INDEX.get_or_init(|| {
        BASE_ALIASES
            .iter()
            .map(|(token, shape)| (*token, shape.expand()))
            .collect()
    })
}

fn array_index() -> &'static AliasIndex {
    ARRAY_INDEX.get_or_init(|| {
        ARRAY_ALIASES
            .iter()
            .map(|(token, shape)| (*token, shape.expand()))
            .collect()
    })
}

/// Tokens of the base table, in table order.
pub fn base_tokens() -> impl Iterator<Item = &'static str> {
    BASE_ALIASES.iter().map(|(token, _)| *token)
}

/// Tokens of the array table, in table order.
pub fn array_tokens() -> impl Iterator<Item = &'static str> {
    ARRAY_ALIASES.iter().map(|(token, _)| *token)
}

/// The expanded constraint for `token`, without any attachment.
pub fn alias(token: &str) -> Option<Constraint> {
    base_index()
        .get(token)
        .or_else(|| array_index().get(token))
        .cloned()
        .or_else(|| (token == id_card::KIND).then(|| Constraint::of_type(id_card::KIND)))
}

/// Expand `token` and merge it over `attach`.
///
/// Alias attributes win on key collisions, so an attachment can add a
/// `message` or a tighter bound but cannot change the alias's `type` or
/// required-ness. An unknown token adds nothing and `attach` comes back
/// unchanged; it is not an error.
pub fn resolve_alias(token: &str, attach: Constraint) -> Constraint {
    match alias(token) {
        Some(expanded) => attach.merge(&expanded),
        None => {
            trace_debug!(token, "unknown rule token, no constraint added");
            attach
        }
    }
}

/// `{type: "enum", values}` over `attach`.
pub fn enum_rule<I, V>(values: I, attach: Constraint) -> Constraint
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let values: Vec<Value> = values.into_iter().map(Into::into).collect();
    attach.merge(&Constraint::of_type("enum").with(attr::VALUES, values))
}

/// `{type: "array", itemType, rule}` over `attach`.
///
/// For `object` items `rule` is the nested rule set of each element; for
/// other item types it is the element constraint.
pub fn array_rule(item_type: &str, rule: impl Into<Value>, attach: Constraint) -> Constraint {
    attach.merge(
        &Constraint::of_type("array")
            .with(attr::ITEM_TYPE, item_type)
            .with(attr::RULE, rule.into()),
    )
}

/// `{type: "object", rule}` over `attach`.
pub fn object_rule(rule: RuleSet, attach: Constraint) -> Constraint {
    attach.merge(&Constraint::of_type("object").with(attr::RULE, Value::from(rule)))
}

/// Register every array token as an evaluator kind.
///
/// A field typed with a token runs the array check with the token's
/// expansion underneath the field's own attributes.
pub fn register_array_kinds(evaluator: &mut Evaluator) {
    for (token, shape) in ARRAY_ALIASES {
        let base = shape.expand();
        evaluator.register(*token, move |check: &Check<'_>| {
            let merged = base.clone().merge(check.constraint);
            check_array(&check.nested(&merged, check.value, check.parent, check.field))
        });
    }
}
