//! # Application Configuration
//!
//! Defaults suit local development. [`AppConfig::from_env`] overlays
//! `XRPC_*` environment variables; unparsable values are ignored with a
//! warning and the default is kept.

use std::path::PathBuf;

/// Default request body limit (2 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Service metadata and server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Service name recorded in the spec.
    pub name: String,
    /// Base URL clients are generated against.
    pub server_url: String,
    /// Where the spec is written.
    pub spec_path: PathBuf,
    /// Write the spec before serving.
    pub auto_gen_spec: bool,
    /// Listening port.
    pub port: u16,
    /// Maximum request body size in bytes.
    pub body_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "xrpc service".to_string(),
            server_url: "http://localhost:9090".to_string(),
            spec_path: PathBuf::from("xrpc.yaml"),
            auto_gen_spec: false,
            port: 9090,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl AppConfig {
    pub fn new(name: impl Into<String>, server_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server_url: server_url.into(),
            ..Self::default()
        }
    }

    pub fn with_spec_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.spec_path = path.into();
        self
    }

    pub fn with_auto_gen_spec(mut self, enabled: bool) -> Self {
        self.auto_gen_spec = enabled;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Defaults overlaid with `XRPC_NAME`, `XRPC_SERVER_URL`,
    /// `XRPC_SPEC_PATH`, `XRPC_AUTO_GEN_SPEC`, `XRPC_PORT` and
    /// `XRPC_BODY_LIMIT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(name) = lookup("XRPC_NAME") {
            config.name = name;
        }
        if let Some(url) = lookup("XRPC_SERVER_URL") {
            config.server_url = url;
        }
        if let Some(path) = lookup("XRPC_SPEC_PATH") {
            config.spec_path = PathBuf::from(path);
        }
        if let Some(flag) = lookup("XRPC_AUTO_GEN_SPEC") {
            config.auto_gen_spec = matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(port) = lookup("XRPC_PORT") {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(_) => tracing::warn!(value = %port, "ignoring invalid XRPC_PORT"),
            }
        }
        if let Some(limit) = lookup("XRPC_BODY_LIMIT") {
            match limit.parse() {
                Ok(limit) => config.body_limit = limit,
                Err(_) => tracing::warn!(value = %limit, "ignoring invalid XRPC_BODY_LIMIT"),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 9090);
        assert_eq!(config.spec_path, PathBuf::from("xrpc.yaml"));
        assert!(!config.auto_gen_spec);
        assert_eq!(config.body_limit, 2 * 1024 * 1024);
    }

    #[test]
    fn environment_overlays_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("XRPC_NAME", "Post Service"),
            ("XRPC_AUTO_GEN_SPEC", "TRUE"),
            ("XRPC_PORT", "8081"),
            ("XRPC_SPEC_PATH", "out/spec.yaml"),
        ]));
        assert_eq!(config.name, "Post Service");
        assert!(config.auto_gen_spec);
        assert_eq!(config.port, 8081);
        assert_eq!(config.spec_path, PathBuf::from("out/spec.yaml"));
        assert_eq!(config.server_url, "http://localhost:9090");
    }

    #[test]
    fn invalid_numbers_keep_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("XRPC_PORT", "not-a-port"),
            ("XRPC_BODY_LIMIT", "-1"),
        ]));
        assert_eq!(config.port, 9090);
        assert_eq!(config.body_limit, DEFAULT_BODY_LIMIT);
    }
}
