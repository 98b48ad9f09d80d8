//! # xrpc-cli: Spec Tooling
//!
//! Provides the `xrpc` binary. It works on the YAML spec an xrpc service
//! writes at startup, so clients can be regenerated without running the
//! service.
//!
//! ## Subcommands
//!
//! - `xrpc generate`: Render a TypeScript (fetch, ky) or Go client.
//! - `xrpc inspect`: List the procedures a spec declares.
//!
//! ```bash
//! xrpc generate --spec xrpc.yaml --target ts-ky --output web/src/api.ts
//! xrpc generate --spec xrpc.yaml --target go --package clients --post-hook "gofmt -w"
//! xrpc inspect --spec xrpc.yaml
//! ```

pub mod generate;
pub mod inspect;

use std::path::Path;

use anyhow::{Context, Result};
use xrpc_core::Spec;

/// Default spec location, matching the server's default `spec_path`.
pub const DEFAULT_SPEC_PATH: &str = "xrpc.yaml";

/// Load a spec file, naming the path on failure.
pub fn load_spec(path: &Path) -> Result<Spec> {
    let spec = Spec::load(path)
        .with_context(|| format!("failed to load spec from {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        procedures = spec.procedures.len(),
        "loaded spec"
    );
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_spec_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let err = load_spec(&path).unwrap_err();
        assert!(format!("{err:#}").contains("absent.yaml"));
    }

    #[test]
    fn loads_written_spec() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xrpc.yaml");
        Spec::new("Post Service", "http://localhost:9090")
            .write(&path)
            .unwrap();
        let spec = load_spec(&path).unwrap();
        assert_eq!(spec.name, "Post Service");
        assert!(spec.procedures.is_empty());
    }
}
