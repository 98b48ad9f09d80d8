//! # Rule Chains
//!
//! A [`RuleSet`] is an ordered list of named rules with last-write-wins
//! replacement by name. [`FieldRules`] wraps a rule set with the rules every
//! kind shares (`required`, `type_check`) and implements [`FieldValidator`].

use std::marker::PhantomData;

use serde_json::Value;

use crate::kind::Kind;
use crate::validator::FieldValidator;

pub(crate) const REQUIRED: &str = "Required";
pub(crate) const TYPE_CHECK: &str = "TypeCheck";
pub(crate) const REQUIRED_MESSAGE: &str = "field is required";

type RawCheck = Box<dyn Fn(Option<&Value>) -> bool + Send + Sync>;
type ValueCheck<P> = Box<dyn Fn(&P) -> bool + Send + Sync>;

enum Check<P> {
    /// Sees the raw value, including absence.
    Raw(RawCheck),
    /// Sees the extracted primitive; skipped when there is none.
    Value(ValueCheck<P>),
}

/// One named predicate and the message reported when it fails.
pub struct Rule<P> {
    name: &'static str,
    message: String,
    check: Check<P>,
}

impl<P> Rule<P> {
    /// A rule evaluated against the raw, possibly absent value.
    pub fn raw<F>(name: &'static str, message: impl Into<String>, check: F) -> Self
    where
        F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    {
        Self {
            name,
            message: message.into(),
            check: Check::Raw(Box::new(check)),
        }
    }

    /// A rule evaluated against the extracted primitive.
    pub fn value<F>(name: &'static str, message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        Self {
            name,
            message: message.into(),
            check: Check::Value(Box::new(check)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Ordered, name-keyed rules.
pub struct RuleSet<P> {
    rules: Vec<Rule<P>>,
    last: Option<&'static str>,
}

impl<P> Default for RuleSet<P> {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            last: None,
        }
    }
}

impl<P> RuleSet<P> {
    /// Insert `rule`, replacing a rule of the same name at its position.
    pub fn upsert(&mut self, rule: Rule<P>) {
        self.last = Some(rule.name);
        match self.rules.iter_mut().find(|r| r.name == rule.name) {
            Some(slot) => *slot = rule,
            None => self.rules.push(rule),
        }
    }

    /// Remove the rule called `name`, if present.
    pub fn remove(&mut self, name: &str) {
        self.rules.retain(|r| r.name != name);
        if self.last == Some(name) {
            self.last = None;
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.name == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Override the message of the most recently configured rule.
    pub fn set_last_message(&mut self, message: impl Into<String>) {
        let Some(name) = self.last else {
            return;
        };
        if let Some(rule) = self.rules.iter_mut().find(|r| r.name == name) {
            rule.message = message.into();
        }
    }

    /// Run the rules in order and return the first failing message.
    pub fn evaluate(&self, raw: Option<&Value>, extracted: Option<&P>) -> Result<(), String> {
        for rule in &self.rules {
            let passed = match (&rule.check, extracted) {
                (Check::Raw(check), _) => check(raw),
                (Check::Value(check), Some(value)) => check(value),
                (Check::Value(_), None) => true,
            };
            if !passed {
                return Err(rule.message.clone());
            }
        }
        Ok(())
    }
}

/// Builder for one field's rule chain, specialized per [`Kind`].
pub struct FieldRules<K: Kind> {
    pub(crate) rules: RuleSet<K::Value>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Kind> Default for FieldRules<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kind> FieldRules<K> {
    pub fn new() -> Self {
        Self {
            rules: RuleSet::default(),
            _kind: PhantomData,
        }
    }

    /// Reject absent or empty values. Also enables [`FieldRules::type_check`].
    pub fn required(mut self) -> Self {
        if !self.rules.contains(TYPE_CHECK) {
            self = self.type_check();
        }
        self.rules
            .upsert(Rule::raw(REQUIRED, REQUIRED_MESSAGE, |raw| !K::is_empty(raw)));
        self
    }

    /// Reject present values of the wrong kind. Absent values pass.
    pub fn type_check(mut self) -> Self {
        self.rules.upsert(Rule::raw(TYPE_CHECK, K::TYPE_MESSAGE, |raw| {
            match raw {
                None | Some(Value::Null) => true,
                Some(value) => K::is_kind(value),
            }
        }));
        self
    }

    /// Drop the type check, including the one enabled by `required()`.
    pub fn skip_type_check(mut self) -> Self {
        self.rules.remove(TYPE_CHECK);
        self
    }

    /// Replace the message of the rule configured last.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.rules.set_last_message(message);
        self
    }

    /// Whether `required()` has been configured.
    pub fn is_required(&self) -> bool {
        self.rules.contains(REQUIRED)
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.names()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl<K: Kind> FieldValidator for FieldRules<K> {
    fn validate(&self, value: Option<&Value>) -> Result<(), String> {
        let extracted = value.and_then(K::extract);
        self.rules.evaluate(value, extracted.as_ref())
    }
}
