//! # xrpc-codegen: Client Generators
//!
//! Turns a persisted [`Spec`] into a typed client: one call function per
//! procedure, named from its path (`/post/list/` → `PostList`), plus the
//! record types its inputs and outputs need.
//!
//! ## Targets
//!
//! - `ts-fetch`: TypeScript over the platform `fetch`.
//! - `ts-ky`: TypeScript over `ky`.
//! - `go`: Go over resty, with a `New<Name>Client` constructor.
//!
//! ## Crate Policy
//!
//! - Rendering is pure and deterministic: procedures and fields are emitted
//!   in declaration order and a record is declared at most once, so an
//!   unchanged spec always renders byte-identical output.
//! - Only [`generate`] touches the filesystem.
//! - A spec renders only if every procedure path yields a distinct, non-empty
//!   function name; otherwise [`render`] fails with a [`NamingError`].

pub mod golang;
pub mod naming;
pub mod types;
pub mod typescript;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use xrpc_core::Spec;

pub use naming::NamingError;
pub use typescript::Flavor;

/// Client flavor to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    TsFetch,
    TsKy,
    Go,
}

impl Target {
    pub const ALL: [Target; 3] = [Self::TsFetch, Self::TsKy, Self::Go];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TsFetch => "ts-fetch",
            Self::TsKy => "ts-ky",
            Self::Go => "go",
        }
    }

    /// Conventional file extension of the generated source.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::TsFetch | Self::TsKy => "ts",
            Self::Go => "go",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown target `{0}` (expected ts-fetch, ts-ky or go)")]
pub struct ParseTargetError(pub String);

impl FromStr for Target {
    type Err = ParseTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|target| target.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseTargetError(s.to_string()))
    }
}

/// Runs after the client file is written, with its path.
pub type PostHook = Box<dyn FnOnce(&Path) -> io::Result<()> + Send>;

pub struct GenerateConfig {
    pub spec: Spec,
    pub target: Target,
    pub output: PathBuf,
    /// Go package name; defaults to the snake-cased service name.
    pub package: Option<String>,
    pub post_hook: Option<PostHook>,
}

impl GenerateConfig {
    pub fn new(spec: Spec, target: Target, output: impl Into<PathBuf>) -> Self {
        Self {
            spec,
            target,
            output: output.into(),
            package: None,
            post_hook: None,
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_post_hook<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&Path) -> io::Result<()> + Send + 'static,
    {
        self.post_hook = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for GenerateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerateConfig")
            .field("spec", &self.spec.name)
            .field("target", &self.target)
            .field("output", &self.output)
            .field("package", &self.package)
            .field("post_hook", &self.post_hook.is_some())
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Naming(#[from] NamingError),

    #[error("failed to write client to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("post-hook failed: {0}")]
    PostHook(#[source] io::Error),
}

/// Render the client source for `target` without writing it.
pub fn render(spec: &Spec, target: Target, package: Option<&str>) -> Result<String, GenerateError> {
    naming::function_names(spec)?;
    Ok(match target {
        Target::TsFetch => typescript::render(spec, Flavor::Fetch),
        Target::TsKy => typescript::render(spec, Flavor::Ky),
        Target::Go => golang::render(spec, package),
    })
}

/// Render, write the file (creating parent directories), then run the
/// post-hook. Returns the written path.
pub fn generate(config: GenerateConfig) -> Result<PathBuf, GenerateError> {
    let GenerateConfig {
        spec,
        target,
        output,
        package,
        post_hook,
    } = config;
    let source = render(&spec, target, package.as_deref())?;

    let io_error = |source: io::Error| GenerateError::Io {
        path: output.clone(),
        source,
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(&output, source.as_bytes()).map_err(io_error)?;
    tracing::info!(
        path = %output.display(),
        flavor = %target,
        procedures = spec.procedures.len(),
        "client generated"
    );

    if let Some(hook) = post_hook {
        hook(&output).map_err(GenerateError::PostHook)?;
        tracing::debug!(path = %output.display(), "post-hook completed");
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use xrpc_core::{FieldDescriptor, ProcedureKind, SpecProcedure, TypeDescriptor};

    fn spec() -> Spec {
        let post = TypeDescriptor::record("Post")
            .field(FieldDescriptor::of::<i64>("id", "id"))
            .field(FieldDescriptor::of::<String>("title", "title"));
        let mut spec = Spec::new("Post Service", "http://localhost:9090");
        spec.push(SpecProcedure {
            path: "/post/list/".to_string(),
            kind: ProcedureKind::Query,
            input: TypeDescriptor::record("ListPostInput")
                .field(FieldDescriptor::of::<Option<i64>>("skip", "skip"))
                .field(FieldDescriptor::of::<Option<i64>>("limit", "limit")),
            output: TypeDescriptor::array_of("Vec<Post>", post.clone()),
        });
        spec.push(SpecProcedure {
            path: "/post/create/".to_string(),
            kind: ProcedureKind::Mutation,
            input: TypeDescriptor::record("CreatePostInput")
                .field(FieldDescriptor::of::<String>("title", "title")),
            output: post,
        });
        spec
    }

    #[test]
    fn target_parsing() {
        assert_eq!("ts-fetch".parse::<Target>(), Ok(Target::TsFetch));
        assert_eq!(" TS-KY ".parse::<Target>(), Ok(Target::TsKy));
        assert_eq!("go".parse::<Target>(), Ok(Target::Go));
        let err = "rust".parse::<Target>().unwrap_err();
        assert!(err.to_string().contains("`rust`"));
        for target in Target::ALL {
            assert_eq!(target.to_string().parse::<Target>(), Ok(target));
        }
    }

    #[test]
    fn rendering_is_idempotent() {
        for target in Target::ALL {
            let first = render(&spec(), target, None).unwrap();
            let second = render(&spec(), target, None).unwrap();
            assert_eq!(first, second, "{target} output differs between runs");
        }
    }

    #[test]
    fn spec_round_trip_renders_identically() {
        let spec = spec();
        let reloaded = Spec::from_yaml(&spec.to_yaml().unwrap()).unwrap();
        for target in Target::ALL {
            assert_eq!(
                render(&spec, target, None).unwrap(),
                render(&reloaded, target, None).unwrap()
            );
        }
    }

    #[test]
    fn generate_writes_file_and_runs_hook() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("clients").join("post_service.go");
        let called = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&called);

        let config = GenerateConfig::new(spec(), Target::Go, &output)
            .with_package("clients")
            .with_post_hook(move |path| {
                assert!(path.exists());
                seen.store(true, Ordering::SeqCst);
                Ok(())
            });
        let written = generate(config).unwrap();

        assert_eq!(written, output);
        assert!(called.load(Ordering::SeqCst));
        let source = std::fs::read_to_string(&output).unwrap();
        assert_eq!(source, render(&spec(), Target::Go, Some("clients")).unwrap());
    }

    #[test]
    fn post_hook_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = GenerateConfig::new(spec(), Target::TsKy, dir.path().join("client.ts"))
            .with_post_hook(|_| Err(io::Error::other("formatter missing")));
        let err = generate(config).unwrap_err();
        assert!(matches!(err, GenerateError::PostHook(_)));
        assert!(err.to_string().contains("formatter missing"));
    }

    #[test]
    fn unnameable_procedures_are_not_written() {
        let mut spec = spec();
        spec.push(SpecProcedure {
            path: "/post_list/".to_string(),
            kind: ProcedureKind::Query,
            input: TypeDescriptor::nil(),
            output: TypeDescriptor::nil(),
        });
        for target in Target::ALL {
            assert!(matches!(
                render(&spec, target, None),
                Err(GenerateError::Naming(NamingError::Collision { .. }))
            ));
        }

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("client.ts");
        let err = generate(GenerateConfig::new(spec, Target::TsFetch, &output)).unwrap_err();
        assert!(err.to_string().contains("PostList"));
        assert!(!output.exists());
    }

    #[test]
    fn root_procedure_is_rejected() {
        let mut spec = Spec::new("Health", "http://localhost:9090");
        spec.push(SpecProcedure {
            path: "/".to_string(),
            kind: ProcedureKind::Query,
            input: TypeDescriptor::nil(),
            output: TypeDescriptor::scalar("String", false),
        });
        let err = render(&spec, Target::Go, None).unwrap_err();
        assert!(matches!(err, GenerateError::Naming(NamingError::Unnamed { .. })));
    }

    #[test]
    fn unwritable_output_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let config = GenerateConfig::new(spec(), Target::TsFetch, blocker.join("client.ts"));
        let err = generate(config).unwrap_err();
        assert!(matches!(err, GenerateError::Io { .. }));
    }
}
