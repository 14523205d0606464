//! Constraint and rule-set model.
//!
//! A [`Constraint`] is an ordered attribute map (`type`, `required`, `min`,
//! ...). Unknown attributes are kept as-is so callers can attach side
//! information such as a custom `message`. A [`RuleSet`] maps field names to
//! constraints in insertion order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute keys understood by the built-in kinds.
pub mod attr {
    pub const TYPE: &str = "type";
    pub const REQUIRED: &str = "required";
    pub const REQUIRE: &str = "require";
    pub const ALLOW_EMPTY: &str = "allowEmpty";
    pub const MIN: &str = "min";
    pub const MAX: &str = "max";
    pub const ITEM_TYPE: &str = "itemType";
    pub const VALUES: &str = "values";
    pub const RULE: &str = "rule";
    pub const FORMAT: &str = "format";
    pub const COMPARE: &str = "compare";
    pub const MESSAGE: &str = "message";
}

/// Fully expanded validation attributes for one field.
///
/// Converting from a JSON value follows the shorthand rules of the rule
/// language: a string `"int"` means `{"type": "int"}` and an array means an
/// enum over its elements. Anything else that is not an object converts to
/// an empty constraint, which imposes no checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct Constraint(Map<String, Value>);

impl Constraint {
    /// An empty constraint.
    pub fn new() -> Self {
        Self::default()
    }

    /// A constraint holding only a `type`.
    pub fn of_type(kind: impl Into<String>) -> Self {
        Self::new().with(attr::TYPE, kind.into())
    }

    /// Set an attribute, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set an attribute in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Shallow merge: every attribute of `over` replaces the one in `self`.
    pub fn merge(mut self, over: &Constraint) -> Self {
        for (key, value) in &over.0 {
            self.0.insert(key.clone(), value.clone());
        }
        self
    }

    /// The `type` discriminator, if present and non-empty.
    pub fn kind(&self) -> Option<&str> {
        self.str_attr(attr::TYPE).filter(|kind| !kind.is_empty())
    }

    /// Whether an absent or null value is an error.
    ///
    /// A field is optional when `required` or `require` is `false`, or when
    /// its `type` carries a trailing `?`.
    pub fn is_required(&self) -> bool {
        self.bool_attr(attr::REQUIRED) != Some(false)
            && self.bool_attr(attr::REQUIRE) != Some(false)
            && !self.kind().is_some_and(|kind| kind.ends_with('?'))
    }

    /// Explicit `allowEmpty`, falling back to "optional fields may be empty".
    ///
    /// Optional means the same thing here as in [`is_required`](Self::is_required),
    /// so a `string?` type allows `""` just like `required: false`.
    pub fn allows_empty(&self) -> bool {
        self.bool_attr(attr::ALLOW_EMPTY)
            .unwrap_or_else(|| !self.is_required())
    }

    pub fn min(&self) -> Option<&Value> {
        self.get(attr::MIN).filter(|v| v.is_number())
    }

    pub fn max(&self) -> Option<&Value> {
        self.get(attr::MAX).filter(|v| v.is_number())
    }

    pub fn item_type(&self) -> Option<&str> {
        self.str_attr(attr::ITEM_TYPE)
    }

    pub fn values(&self) -> Option<&Vec<Value>> {
        self.get(attr::VALUES).and_then(Value::as_array)
    }

    /// Nested rule for `object` and `array` constraints.
    pub fn rule(&self) -> Option<&Value> {
        self.get(attr::RULE)
    }

    pub fn format(&self) -> Option<&str> {
        self.str_attr(attr::FORMAT)
    }

    pub fn compare(&self) -> Option<&str> {
        self.str_attr(attr::COMPARE)
    }

    /// Custom message overriding the evaluator's report.
    pub fn message(&self) -> Option<&str> {
        self.str_attr(attr::MESSAGE).filter(|m| !m.is_empty())
    }

    fn str_attr(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn bool_attr(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }
}

impl From<Map<String, Value>> for Constraint {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Value> for Constraint {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            Value::String(kind) => Self::of_type(kind),
            Value::Array(values) => Self::of_type("enum").with(attr::VALUES, values),
            _ => Self::new(),
        }
    }
}

impl From<&str> for Constraint {
    fn from(kind: &str) -> Self {
        Self::of_type(kind)
    }
}

impl From<Constraint> for Value {
    fn from(constraint: Constraint) -> Self {
        Value::Object(constraint.0)
    }
}

/// Field name to constraint mapping for one level of a record.
///
/// Field names are unique; inserting an existing name replaces its
/// constraint in place, keeping the original position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct RuleSet {
    fields: Vec<(String, Constraint)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A rule set holding a single field.
    pub fn singleton(field: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            fields: vec![(field.into(), constraint)],
        }
    }

    /// Add a field, builder style.
    pub fn field(mut self, name: impl Into<String>, constraint: impl Into<Constraint>) -> Self {
        self.insert(name, constraint);
        self
    }

    /// Add or replace a field.
    pub fn insert(&mut self, name: impl Into<String>, constraint: impl Into<Constraint>) {
        let name = name.into();
        let constraint = constraint.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = constraint,
            None => self.fields.push((name, constraint)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Constraint> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, constraint)| constraint)
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Constraint)> {
        self.fields
            .iter()
            .map(|(field, constraint)| (field.as_str(), constraint))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, C> FromIterator<(K, C)> for RuleSet
where
    K: Into<String>,
    C: Into<Constraint>,
{
    fn from_iter<I: IntoIterator<Item = (K, C)>>(iter: I) -> Self {
        let mut rules = Self::new();
        for (name, constraint) in iter {
            rules.insert(name, constraint);
        }
        rules
    }
}

impl From<Value> for RuleSet {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => Self::new(),
        }
    }
}

impl From<&Value> for RuleSet {
    fn from(value: &Value) -> Self {
        Self::from(value.clone())
    }
}

impl From<RuleSet> for Value {
    fn from(rules: RuleSet) -> Self {
        Value::Object(
            rules
                .fields
                .into_iter()
                .map(|(field, constraint)| (field, Value::from(constraint)))
                .collect(),
        )
    }
}
