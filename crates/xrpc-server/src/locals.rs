//! # Request Locals
//!
//! Key/value state shared by the interceptors and handler of one request.
//! Each request reads through an immutable snapshot of the app's locals and
//! writes to its own overlay, so requests never observe each other's writes.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Copy-on-write view over the app-level locals.
#[derive(Debug, Clone, Default)]
pub struct Locals {
    base: Arc<BTreeMap<String, Value>>,
    /// `None` marks a key removed in this request.
    overlay: BTreeMap<String, Option<Value>>,
}

impl Locals {
    /// A fresh view over `base`.
    pub fn new(base: Arc<BTreeMap<String, Value>>) -> Self {
        Self {
            base,
            overlay: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self.overlay.get(key) {
            Some(entry) => entry.as_ref(),
            None => self.base.get(key),
        }
    }

    /// Decode the value under `key`, or `None` if absent or of another shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.overlay.insert(key.into(), Some(value.into()));
    }

    /// Hide `key` for the rest of this request.
    pub fn remove(&mut self, key: &str) {
        self.overlay.insert(key.to_string(), None);
    }

    /// Visible keys in order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .base
            .keys()
            .filter(|key| !self.overlay.contains_key(key.as_str()))
            .map(String::as_str)
            .collect();
        keys.extend(
            self.overlay
                .iter()
                .filter(|(_, value)| value.is_some())
                .map(|(key, _)| key.as_str()),
        );
        keys.sort_unstable();
        keys
    }
}
