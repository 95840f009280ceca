use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::SchemagenConfig;

/// Generate ordered validation schemas from service type models.
#[derive(Parser)]
#[command(name = "normalize-schemagen", version)]
struct Cli {
    /// Project root used to find .normalize/schemagen.toml
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate schemas from a service model
    Generate(commands::generate::GenerateArgs),
    /// List available output backends
    Backends,
}

/// Schema flag support for Nursery integration.
fn handle_schema_flag() -> bool {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("--schema") {
        let response = serde_json::json!({
            "config_path": ".normalize/schemagen.toml",
            "format": "toml",
            "schema": schemars::schema_for!(SchemagenConfig)
        });
        println!("{}", serde_json::to_string_pretty(&response).unwrap());
        true
    } else {
        false
    }
}

/// Log to stderr, filtered by RUST_LOG (warnings only by default).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    // Handle --schema before clap parsing
    if handle_schema_flag() {
        return;
    }

    init_tracing();
    let cli = Cli::parse();

    let config = match SchemagenConfig::load(&cli.root) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Command::Generate(args) => commands::generate::run(args, &config),
        Command::Backends => commands::backends::run(),
    };
    std::process::exit(code);
}
