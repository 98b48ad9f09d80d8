//! # Input Binding
//!
//! Reads a request into a normalized JSON payload, then decodes the
//! procedure's input type from it. Queries read the URL query string,
//! mutations read a JSON body. Keys are matched against the input descriptor
//! case-insensitively and rewritten to the field alias, so `{"Title": ...}`
//! binds a field keyed `title`.
//!
//! The payload is what validators see. Query values are coerced to the
//! declared primitive of their field first; a value that does not parse
//! stays a string and fails the type check or the decode.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use xrpc_core::TypeDescriptor;

use crate::error::XrpcError;

/// Lowercased declared names and aliases, mapped to the field.
struct KeyIndex<'a> {
    fields: HashMap<String, &'a xrpc_core::FieldDescriptor>,
}

impl<'a> KeyIndex<'a> {
    fn new(descriptor: &'a TypeDescriptor) -> Self {
        let mut fields = HashMap::new();
        for field in &descriptor.fields {
            fields.insert(field.name.to_lowercase(), field);
        }
        // Aliases win over declared names that lowercase the same.
        for field in &descriptor.fields {
            fields.insert(field.alias.to_lowercase(), field);
        }
        Self { fields }
    }

    fn is_alias(&self, key: &str) -> bool {
        self.fields.values().any(|field| field.alias == key)
    }

    fn resolve(&self, key: &str) -> String {
        self.fields
            .get(&key.to_lowercase())
            .map(|field| field.alias.clone())
            .unwrap_or_else(|| key.to_string())
    }

    /// Declared type of the field keyed by `alias`.
    fn ty(&self, alias: &str) -> Option<&str> {
        self.fields
            .values()
            .find(|field| field.alias == alias)
            .map(|field| field.ty.as_str())
    }

    /// Rewrite `pairs` to alias keys. Exact alias keys take precedence over
    /// keys that only match case-insensitively.
    fn normalize<V>(&self, pairs: Vec<(String, V)>) -> Vec<(String, V)> {
        let (exact, loose): (Vec<_>, Vec<_>) =
            pairs.into_iter().partition(|(key, _)| self.is_alias(key));
        let mut out: Vec<(String, V)> = exact;
        for (key, value) in loose {
            let target = self.resolve(&key);
            if !out.iter().any(|(k, _)| *k == target) {
                out.push((target, value));
            }
        }
        out
    }
}

/// Parse a query value as the primitive `ty` names, if it is one.
fn coerce(ty: Option<&str>, value: String) -> Value {
    let parsed = match ty {
        Some("i8" | "i16" | "i32" | "i64" | "i128" | "isize") => {
            value.parse::<i64>().ok().map(Value::from)
        }
        Some("u8" | "u16" | "u32" | "u64" | "u128" | "usize") => {
            value.parse::<u64>().ok().map(Value::from)
        }
        Some("f32" | "f64") => value
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        Some("bool") => value.parse::<bool>().ok().map(Value::Bool),
        _ => None,
    };
    parsed.unwrap_or(Value::String(value))
}

/// Read a query string into a payload object.
pub(crate) fn read_query(descriptor: &TypeDescriptor, query: Option<&str>) -> Result<Value, XrpcError> {
    let query = query.unwrap_or_default();
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(query).map_err(|err| XrpcError::bad_request(err.to_string()))?;
    let index = KeyIndex::new(descriptor);
    let object = index
        .normalize(pairs)
        .into_iter()
        .map(|(key, value)| {
            let value = coerce(index.ty(&key), value);
            (key, value)
        })
        .collect();
    Ok(Value::Object(object))
}

/// Read a JSON body into a payload. An empty body reads as `{}`.
pub(crate) fn read_json(descriptor: &TypeDescriptor, body: &[u8]) -> Result<Value, XrpcError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    let value = serde_json::from_slice::<Value>(body)
        .map_err(|err| XrpcError::bad_request(err.to_string()))?;
    Ok(match value {
        Value::Object(map) if descriptor.is_record() => {
            let pairs = KeyIndex::new(descriptor).normalize(map.into_iter().collect());
            Value::Object(pairs.into_iter().collect())
        }
        other => other,
    })
}

/// Decode the typed input from a payload. Inputs without a shape ignore the
/// payload; an empty payload also decodes as absent when the type allows it.
pub(crate) fn decode<I: DeserializeOwned>(descriptor: &TypeDescriptor, raw: &Value) -> Result<I, XrpcError> {
    if descriptor.is_nil() {
        return serde_json::from_value(Value::Null)
            .map_err(|err| XrpcError::bad_request(err.to_string()));
    }
    match serde_json::from_value::<I>(raw.clone()) {
        Ok(input) => Ok(input),
        Err(err) if raw.as_object().is_some_and(Map::is_empty) => {
            serde_json::from_value(Value::Null).map_err(|_| XrpcError::bad_request(err.to_string()))
        }
        Err(err) => Err(XrpcError::bad_request(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use xrpc_core::Shape;

    #[derive(Debug, PartialEq, Shape, Serialize, Deserialize)]
    struct ListPostInput {
        skip: Option<i64>,
        limit: Option<i64>,
    }

    #[derive(Debug, PartialEq, Shape, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct CreatePostInput {
        title: String,
        author_id: Option<i64>,
    }

    #[derive(Debug, PartialEq, Shape, Serialize, Deserialize)]
    struct SearchInput {
        term: String,
        score: f64,
        exact: bool,
    }

    fn query<I: DeserializeOwned + Shape>(query: Option<&str>) -> Result<(I, Value), XrpcError> {
        let descriptor = I::descriptor();
        let raw = read_query(&descriptor, query)?;
        Ok((decode(&descriptor, &raw)?, raw))
    }

    fn body<I: DeserializeOwned + Shape>(body: &[u8]) -> Result<(I, Value), XrpcError> {
        let descriptor = I::descriptor();
        let raw = read_json(&descriptor, body)?;
        Ok((decode(&descriptor, &raw)?, raw))
    }

    #[test]
    fn query_values_are_coerced() {
        let (input, raw) = query::<ListPostInput>(Some("skip=2&limit=10")).unwrap();
        assert_eq!(
            input,
            ListPostInput {
                skip: Some(2),
                limit: Some(10)
            }
        );
        assert_eq!(raw, json!({"skip": 2, "limit": 10}));
    }

    #[test]
    fn query_coercion_follows_declared_types() {
        let (input, raw) = query::<SearchInput>(Some("term=42&score=2&exact=true")).unwrap();
        assert_eq!(input.term, "42");
        assert_eq!(input.score, 2.0);
        assert!(input.exact);
        assert!(raw["term"].is_string());
        assert!(raw["score"].is_f64());
    }

    #[test]
    fn query_keys_match_case_insensitively() {
        let (input, _) = query::<ListPostInput>(Some("Skip=1&LIMIT=3")).unwrap();
        assert_eq!(input.skip, Some(1));
        assert_eq!(input.limit, Some(3));
    }

    #[test]
    fn missing_query_binds_empty_input() {
        let (input, raw) = query::<ListPostInput>(None).unwrap();
        assert_eq!(input.skip, None);
        assert_eq!(raw, json!({}));
    }

    #[test]
    fn unit_input_binds_from_nothing() {
        let (_, raw) = query::<()>(None).unwrap();
        assert_eq!(raw, json!({}));
        let (_, raw) = body::<()>(b"").unwrap();
        assert_eq!(raw, json!({}));
        let (_, raw) = body::<()>(b"{}").unwrap();
        assert_eq!(raw, json!({}));
    }

    #[test]
    fn unparsable_query_value_stays_a_string() {
        let descriptor = ListPostInput::descriptor();
        let raw = read_query(&descriptor, Some("skip=two")).unwrap();
        assert_eq!(raw, json!({"skip": "two"}));
        let err = decode::<ListPostInput>(&descriptor, &raw).err().unwrap();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn body_keys_resolve_names_and_aliases() {
        let (input, raw) = body::<CreatePostInput>(br#"{"Title": "hello", "AUTHOR_ID": 4}"#).unwrap();
        assert_eq!(input.title, "hello");
        assert_eq!(input.author_id, Some(4));
        assert_eq!(raw, json!({"title": "hello", "authorId": 4}));
    }

    #[test]
    fn exact_alias_beats_loose_match() {
        let (input, _) = body::<CreatePostInput>(br#"{"TITLE": "loose", "title": "exact"}"#).unwrap();
        assert_eq!(input.title, "exact");
    }

    #[test]
    fn malformed_body_is_400() {
        let err = read_json(&CreatePostInput::descriptor(), b"{nope").err().unwrap();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_member_fails_decode_not_read() {
        let descriptor = CreatePostInput::descriptor();
        let raw = read_json(&descriptor, b"").unwrap();
        assert_eq!(raw, json!({}));
        let err = decode::<CreatePostInput>(&descriptor, &raw).err().unwrap();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.detail().as_str().unwrap().contains("title"));
    }
}
