//! # Inspect: Summarize a spec file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use xrpc_core::Spec;

use crate::{load_spec, DEFAULT_SPEC_PATH};

/// Arguments for `xrpc inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Spec file written by the service.
    #[arg(long, default_value = DEFAULT_SPEC_PATH)]
    pub spec: PathBuf,
}

/// Execute the inspect subcommand.
pub fn run_inspect(args: &InspectArgs) -> Result<u8> {
    let spec = load_spec(&args.spec)?;
    print!("{}", summary(&spec));
    Ok(0)
}

/// One line per procedure: kind, path, input and output type names.
pub fn summary(spec: &Spec) -> String {
    let mut out = format!("{} ({})\n", spec.name, spec.server_url);
    let width = spec
        .procedures
        .iter()
        .map(|p| p.path.len())
        .max()
        .unwrap_or(0);
    for procedure in &spec.procedures {
        out.push_str(&format!(
            "  {:<8} {:<width$}  {} -> {}\n",
            procedure.kind.as_str(),
            procedure.path,
            procedure.input.type_name,
            procedure.output.type_name,
        ));
    }
    out.push_str(&format!("{} procedures\n", spec.procedures.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrpc_core::{ProcedureKind, SpecProcedure, TypeDescriptor};

    #[test]
    fn summary_lists_procedures_in_order() {
        let mut spec = Spec::new("Post Service", "http://localhost:9090");
        spec.push(SpecProcedure {
            path: "/post/list/".to_string(),
            kind: ProcedureKind::Query,
            input: TypeDescriptor::record("ListPostInput"),
            output: TypeDescriptor::array_of("Vec<Post>", TypeDescriptor::record("Post")),
        });
        spec.push(SpecProcedure {
            path: "/post/create/".to_string(),
            kind: ProcedureKind::Mutation,
            input: TypeDescriptor::record("CreatePostInput"),
            output: TypeDescriptor::record("Post"),
        });

        let text = summary(&spec);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Post Service (http://localhost:9090)");
        assert_eq!(lines[1], "  Query    /post/list/    ListPostInput -> Vec<Post>");
        assert_eq!(lines[2], "  Mutation /post/create/  CreatePostInput -> Post");
        assert_eq!(lines[3], "2 procedures");
    }

    #[test]
    fn inspect_reads_spec_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xrpc.yaml");
        Spec::new("Empty", "http://localhost:9090").write(&path).unwrap();
        assert_eq!(run_inspect(&InspectArgs { spec: path }).unwrap(), 0);
    }
}
