//! # Service Spec Document
//!
//! The spec accumulates one entry per registered procedure and is persisted
//! as YAML for the client generators:
//!
//! ```yaml
//! name: Post Service
//! server_url: http://localhost:9090
//! procedures:
//!   - path: /post/list/
//!     type: Query
//!     input: { type_name: ListPostInput, fields: [...], nillable: false }
//!     output: { type_name: Vec<Post>, nillable: false, array: {...} }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::descriptor::TypeDescriptor;
use crate::error::SpecError;

/// Whether a procedure reads (GET) or writes (POST).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcedureKind {
    Query,
    Mutation,
}

impl ProcedureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Mutation => "Mutation",
        }
    }
}

impl fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One registered procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecProcedure {
    /// Canonical path, identical to the router binding.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: ProcedureKind,
    pub input: TypeDescriptor,
    pub output: TypeDescriptor,
}

/// The service description consumed by client generators.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Spec {
    pub name: String,
    pub server_url: String,
    #[serde(default)]
    pub procedures: Vec<SpecProcedure>,
}

impl Spec {
    pub fn new(name: impl Into<String>, server_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server_url: server_url.into(),
            procedures: Vec::new(),
        }
    }

    /// Append a procedure entry.
    pub fn push(&mut self, procedure: SpecProcedure) {
        self.procedures.push(procedure);
    }

    /// Look up a procedure by canonical path.
    pub fn procedure(&self, path: &str) -> Option<&SpecProcedure> {
        self.procedures.iter().find(|p| p.path == path)
    }

    pub fn to_yaml(&self) -> Result<String, SpecError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(source: &str) -> Result<Self, SpecError> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Write the spec to `path`, creating parent directories as needed.
    pub fn write(&self, path: &Path) -> Result<(), SpecError> {
        let yaml = self.to_yaml()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SpecError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, yaml).map_err(|source| SpecError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a spec previously written with [`Spec::write`].
    pub fn load(path: &Path) -> Result<Self, SpecError> {
        let source = std::fs::read_to_string(path).map_err(|source| SpecError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&source)
    }
}
