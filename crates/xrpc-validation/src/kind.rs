//! # Value Kinds
//!
//! A [`Kind`] says how a raw JSON value is recognized, considered empty and
//! narrowed to a primitive. Each kind also contributes its own builder
//! methods on [`FieldRules`].

use regex::Regex;
use serde_json::Value;

use crate::rule::{FieldRules, Rule, REQUIRED};

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// How one family of values is recognized and extracted.
pub trait Kind: 'static {
    /// Primitive the non-structural rules operate on.
    type Value: 'static;

    /// Message of the `TypeCheck` rule.
    const TYPE_MESSAGE: &'static str;

    /// Whether the raw value counts as missing for `required()`.
    fn is_empty(raw: Option<&Value>) -> bool;

    /// Whether a present value belongs to this kind.
    fn is_kind(value: &Value) -> bool;

    /// Narrow a present value to the primitive, if it is of this kind.
    fn extract(value: &Value) -> Option<Self::Value>;
}

/// JSON strings.
pub struct StringKind;

impl Kind for StringKind {
    type Value = String;

    const TYPE_MESSAGE: &'static str = "input must be a string";

    fn is_empty(raw: Option<&Value>) -> bool {
        match raw {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        }
    }

    fn is_kind(value: &Value) -> bool {
        value.is_string()
    }

    fn extract(value: &Value) -> Option<String> {
        value.as_str().map(str::to_string)
    }
}

/// JSON integers, signed or unsigned.
pub struct IntKind;

impl Kind for IntKind {
    type Value = i128;

    const TYPE_MESSAGE: &'static str = "input must be a number";

    fn is_empty(raw: Option<&Value>) -> bool {
        matches!(raw, None | Some(Value::Null))
    }

    fn is_kind(value: &Value) -> bool {
        value.is_i64() || value.is_u64()
    }

    fn extract(value: &Value) -> Option<i128> {
        value
            .as_i64()
            .map(i128::from)
            .or_else(|| value.as_u64().map(i128::from))
    }
}

/// JSON numbers with a fractional representation.
pub struct FloatKind;

impl Kind for FloatKind {
    type Value = f64;

    const TYPE_MESSAGE: &'static str = "input must be a float";

    fn is_empty(raw: Option<&Value>) -> bool {
        matches!(raw, None | Some(Value::Null))
    }

    fn is_kind(value: &Value) -> bool {
        value.is_f64()
    }

    fn extract(value: &Value) -> Option<f64> {
        value.as_f64()
    }
}

/// JSON documents: objects, arrays, or strings holding either.
pub struct JsonKind;

impl JsonKind {
    fn parse(value: &Value) -> Option<Value> {
        match value {
            Value::Object(_) | Value::Array(_) => Some(value.clone()),
            Value::String(s) => serde_json::from_str::<Value>(s)
                .ok()
                .filter(|parsed| !parsed.is_null()),
            _ => None,
        }
    }
}

impl Kind for JsonKind {
    type Value = Value;

    const TYPE_MESSAGE: &'static str = "input must be json";

    fn is_empty(raw: Option<&Value>) -> bool {
        let Some(value) = raw else {
            return true;
        };
        match Self::parse(value) {
            Some(Value::Object(map)) => map.is_empty(),
            Some(Value::Array(items)) => items.is_empty(),
            Some(_) => false,
            None => value.is_null(),
        }
    }

    fn is_kind(value: &Value) -> bool {
        Self::parse(value).is_some()
    }

    fn extract(value: &Value) -> Option<Value> {
        Self::parse(value)
    }
}

impl FieldRules<StringKind> {
    /// Exact length in characters.
    pub fn length(mut self, n: usize) -> Self {
        self.rules.upsert(Rule::value(
            "Length",
            format!("length required is {n}"),
            move |s: &String| s.chars().count() == n,
        ));
        self
    }

    /// Minimum length in characters.
    pub fn min_length(mut self, n: usize) -> Self {
        self.rules.upsert(Rule::value(
            "MinLength",
            format!("minimum length required is {n}"),
            move |s: &String| s.chars().count() >= n,
        ));
        self
    }

    /// Maximum length in characters.
    pub fn max_length(mut self, n: usize) -> Self {
        self.rules.upsert(Rule::value(
            "MaxLength",
            format!("maximum length required is {n}"),
            move |s: &String| s.chars().count() <= n,
        ));
        self
    }

    /// Require a match of `pattern`. An invalid pattern fails every value.
    pub fn regex(mut self, pattern: &str) -> Self {
        let rule = match Regex::new(pattern) {
            Ok(re) => Rule::value(
                "Regex",
                format!("string does not match regex: {pattern}"),
                move |s: &String| re.is_match(s),
            ),
            Err(err) => Rule::raw("Regex", format!("invalid regex pattern: {err}"), |_| false),
        };
        self.rules.upsert(rule);
        self
    }

    /// Require an email address. Only applies after `required()`.
    pub fn email(self) -> Self {
        if !self.rules.contains(REQUIRED) {
            return self;
        }
        self.regex(EMAIL_PATTERN).with_message("invalid email format")
    }
}

impl FieldRules<IntKind> {
    pub fn min(mut self, n: i64) -> Self {
        self.rules.upsert(Rule::value(
            "Min",
            format!("min value required is {n}"),
            move |v: &i128| *v >= i128::from(n),
        ));
        self
    }

    pub fn max(mut self, n: i64) -> Self {
        self.rules.upsert(Rule::value(
            "Max",
            format!("max value required is {n}"),
            move |v: &i128| *v <= i128::from(n),
        ));
        self
    }
}

impl FieldRules<FloatKind> {
    pub fn min(mut self, n: f64) -> Self {
        self.rules.upsert(Rule::value(
            "Min",
            format!("min value required is {n:.6}"),
            move |v: &f64| *v >= n,
        ));
        self
    }

    pub fn max(mut self, n: f64) -> Self {
        self.rules.upsert(Rule::value(
            "Max",
            format!("max value required is {n:.6}"),
            move |v: &f64| *v <= n,
        ));
        self
    }
}
