//! # Spec Persistence Errors

use std::path::PathBuf;

use thiserror::Error;

/// Failure reading or writing a spec document.
#[derive(Error, Debug)]
pub enum SpecError {
    /// The spec file could not be read or written.
    #[error("spec io error for '{path}': {source}")]
    Io {
        /// File the operation targeted.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The spec could not be encoded to or decoded from YAML.
    #[error("spec yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
