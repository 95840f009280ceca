//! Generate command - ordered schemas from a service model.

use crate::config::SchemagenConfig;
use anyhow::{Context, anyhow, bail};
use clap::Args;
use normalize_schemagen::{
    PascalNaming, ServiceModel, Synthesis, backend_names, generate, get_backend,
};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Generate command arguments
#[derive(Args)]
pub struct GenerateArgs {
    /// Service model JSON file, use - for stdin
    pub input: PathBuf,

    /// Output backend (zod, json); defaults to the configured backend
    #[arg(short, long)]
    pub backend: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Omit the 'export' keyword
    #[arg(long)]
    pub no_export: bool,

    /// Emit `z.infer` type aliases next to each schema
    #[arg(long)]
    pub infer_types: bool,

    /// Suffix appended to schema identifiers
    #[arg(long)]
    pub suffix: Option<String>,

    /// Fail instead of falling back to lazy references on cycles
    #[arg(long)]
    pub deny_circular: bool,
}

/// Run the generate command.
pub fn run(args: GenerateArgs, config: &SchemagenConfig) -> i32 {
    match execute(args, config) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {:#}", e);
            1
        }
    }
}

fn execute(args: GenerateArgs, config: &SchemagenConfig) -> anyhow::Result<()> {
    let model = read_model(&args.input)?;
    let synthesis = generate(&model, &PascalNaming)?;
    check_circular(&synthesis, args.deny_circular)?;

    let backend_name = args.backend.as_deref().unwrap_or(config.backend());
    let backend = get_backend(backend_name).ok_or_else(|| {
        anyhow!(
            "unknown backend: {} (available: {})",
            backend_name,
            backend_names().join(", ")
        )
    })?;

    let mut options = config.emit_options();
    if args.no_export {
        options.export = false;
    }
    if args.infer_types {
        options.infer_types = true;
    }
    if let Some(suffix) = args.suffix {
        options.schema_suffix = suffix;
    }

    let code = backend.generate(&synthesis, &options);
    match args.output {
        Some(path) => {
            std::fs::write(&path, &code)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Generated {}", path.display());
        }
        None => print!("{}", code),
    }
    Ok(())
}

fn read_model(input: &Path) -> anyhow::Result<ServiceModel> {
    if input.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("failed to read model from stdin")?;
        return Ok(ServiceModel::from_json_str(&content)?);
    }
    Ok(ServiceModel::load(input)?)
}

fn check_circular(synthesis: &Synthesis, deny: bool) -> anyhow::Result<()> {
    if synthesis.circular.is_empty() {
        return Ok(());
    }
    let names: Vec<&str> = synthesis.circular.iter().map(|d| d.name.as_str()).collect();
    if deny {
        bail!("circular references between {}", names.join(", "));
    }
    tracing::info!(names = %names.join(", "), "emitting circular schemas lazily");
    Ok(())
}
