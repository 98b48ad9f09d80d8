//! # Generate: Client files from a spec.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Result};
use clap::Args;
use xrpc_codegen::{naming::snake_case, GenerateConfig, Target};

use crate::{load_spec, DEFAULT_SPEC_PATH};

/// Arguments for `xrpc generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Spec file written by the service.
    #[arg(long, default_value = DEFAULT_SPEC_PATH)]
    pub spec: PathBuf,

    /// Client flavor: ts-fetch, ts-ky or go.
    #[arg(long)]
    pub target: Target,

    /// Output file. Defaults to `<service_name>.<ext>` in the current directory.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Go package name. Defaults to the snake-cased service name.
    #[arg(long)]
    pub package: Option<String>,

    /// Command run after writing, with the output path appended
    /// (e.g. "gofmt -w" or "npx prettier --write").
    #[arg(long)]
    pub post_hook: Option<String>,
}

/// Execute the generate subcommand.
pub fn run_generate(args: &GenerateArgs) -> Result<u8> {
    let spec = load_spec(&args.spec)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&spec.name, args.target));

    let mut config = GenerateConfig::new(spec, args.target, output);
    if let Some(package) = &args.package {
        config = config.with_package(package.clone());
    }
    if let Some(hook) = &args.post_hook {
        let argv = hook_argv(hook)?;
        config = config.with_post_hook(move |path| run_hook(&argv, path));
    }

    let written = xrpc_codegen::generate(config)?;
    println!("wrote {} client to {}", args.target, written.display());
    Ok(0)
}

fn default_output(service: &str, target: Target) -> PathBuf {
    let stem = match snake_case(service) {
        stem if stem.is_empty() => "client".to_string(),
        stem => stem,
    };
    PathBuf::from(format!("{stem}.{}", target.extension()))
}

fn hook_argv(hook: &str) -> Result<Vec<String>> {
    let argv: Vec<String> = hook.split_whitespace().map(str::to_string).collect();
    if argv.is_empty() {
        bail!("--post-hook must name a command");
    }
    Ok(argv)
}

fn run_hook(argv: &[String], path: &Path) -> io::Result<()> {
    let Some((program, rest)) = argv.split_first() else {
        return Ok(());
    };
    tracing::info!(command = %argv.join(" "), path = %path.display(), "running post-hook");
    let status = Command::new(program).args(rest).arg(path).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("`{}` exited with {status}", argv.join(" "))))
    }
}
