//! # Record Validator
//!
//! Maps declared field names to field validators and checks a whole input
//! value, producing an alias-keyed error map.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use xrpc_core::Shape;

/// Anything that can check one (possibly absent) value.
pub trait FieldValidator: Send + Sync {
    fn validate(&self, value: Option<&Value>) -> Result<(), String>;
}

impl<F> FieldValidator for F
where
    F: Fn(Option<&Value>) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, value: Option<&Value>) -> Result<(), String> {
        self(value)
    }
}

/// Alias-keyed validation messages. Never empty when returned as an error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.insert(key.into(), message.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{key}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Per-field validators for one record shape.
#[derive(Default)]
pub struct Validator {
    fields: BTreeMap<String, Box<dyn FieldValidator>>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a validator to the field declared as `name`. Re-adding a name
    /// replaces its validator.
    pub fn field(mut self, name: impl Into<String>, validator: impl FieldValidator + 'static) -> Self {
        self.fields.insert(name.into(), Box::new(validator));
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check `input` against every registered field.
    pub fn validate<T: Shape + Serialize>(&self, input: &T) -> Result<(), FieldErrors> {
        let value = match serde_json::to_value(input) {
            Ok(value) => value,
            Err(err) => {
                let mut errors = FieldErrors::default();
                errors.insert("error", err.to_string());
                return Err(errors);
            }
        };
        self.validate_value(&T::descriptor(), &value)
    }

    /// Check an already serialized input against `descriptor`.
    pub fn validate_value(
        &self,
        descriptor: &xrpc_core::TypeDescriptor,
        value: &Value,
    ) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        let Some(object) = value.as_object().filter(|_| descriptor.is_record()) else {
            errors.insert("error", "input must be a struct");
            return Err(errors);
        };

        for (name, validator) in &self.fields {
            let Some(field) = descriptor.find_field(name) else {
                errors.insert(name.clone(), format!("no such field: {name} in input"));
                continue;
            };
            if let Err(message) = validator.validate(object.get(&field.alias)) {
                errors.insert(field.alias.clone(), message);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;
    use serde_json::json;
    use xrpc_core::Shape;

    use super::*;
    use crate::{number, string};

    #[derive(Shape, Serialize)]
    struct ListPostInput {
        skip: Option<i64>,
        limit: Option<i64>,
    }

    #[derive(Shape, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct CreatePostInput {
        post_title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        body_text: Option<String>,
    }

    fn list_validator() -> Validator {
        Validator::new()
            .field("skip", number().min(0))
            .field("limit", number().max(10))
    }

    #[test]
    fn passes_within_bounds() {
        let input = ListPostInput {
            skip: Some(2),
            limit: Some(10),
        };
        assert!(list_validator().validate(&input).is_ok());
    }

    #[test]
    fn reports_one_entry_per_failing_field() {
        let input = ListPostInput {
            skip: Some(2),
            limit: Some(11),
        };
        let errors = list_validator().validate(&input).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("limit"), Some("max value required is 10"));
    }

    #[test]
    fn absent_optional_fields_pass() {
        let input = ListPostInput {
            skip: None,
            limit: None,
        };
        assert!(list_validator().validate(&input).is_ok());
    }

    #[test]
    fn messages_are_keyed_by_alias() {
        let v = Validator::new()
            .field("post_title", string().min_length(10).required())
            .field("body_text", string().required());
        let input = CreatePostInput {
            post_title: "short".to_string(),
            body_text: None,
        };
        let errors = v.validate(&input).unwrap_err();
        assert_eq!(errors.get("postTitle"), Some("minimum length required is 10"));
        assert_eq!(errors.get("bodyText"), Some("field is required"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn unknown_field_is_reported_by_name() {
        let v = Validator::new().field("offset", number().min(0));
        let input = ListPostInput {
            skip: None,
            limit: None,
        };
        let errors = v.validate(&input).unwrap_err();
        assert_eq!(errors.get("offset"), Some("no such field: offset in input"));
    }

    #[test]
    fn non_record_input_is_rejected() {
        let v = Validator::new().field("x", number());
        let errors = v.validate(&42i64).unwrap_err();
        assert_eq!(errors.get("error"), Some("input must be a struct"));
    }

    #[derive(Shape, Serialize)]
    struct Ping {}

    #[test]
    fn memberless_record_reports_unknown_field() {
        let v = Validator::new().field("token", string().required());
        let errors = v.validate(&Ping {}).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("token"), Some("no such field: token in input"));
    }

    #[test]
    fn sequences_are_not_records() {
        let v = Validator::new().field("x", number());
        let errors = v.validate(&vec![1i64]).unwrap_err();
        assert_eq!(errors.get("error"), Some("input must be a struct"));
    }

    #[test]
    fn replacing_a_field_keeps_one_entry() {
        let v = Validator::new()
            .field("limit", number().max(1))
            .field("limit", number().max(100));
        assert_eq!(v.len(), 1);
        let input = ListPostInput {
            skip: None,
            limit: Some(50),
        };
        assert!(v.validate(&input).is_ok());
    }

    #[test]
    fn closures_are_field_validators() {
        let v = Validator::new().field("skip", |value: Option<&Value>| match value {
            Some(v) if v == &json!(13) => Err("unlucky".to_string()),
            _ => Ok(()),
        });
        let input = ListPostInput {
            skip: Some(13),
            limit: None,
        };
        assert_eq!(v.validate(&input).unwrap_err().get("skip"), Some("unlucky"));
    }

    #[test]
    fn errors_serialize_as_flat_map() {
        let mut errors = FieldErrors::default();
        errors.insert("limit", "max value required is 10");
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({"limit": "max value required is 10"})
        );
        assert_eq!(errors.to_string(), "limit: max value required is 10");
    }
}
