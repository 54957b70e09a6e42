//! Swagger Diff CLI
//!
//! Command-line interface for comparing two Swagger 2.0 API descriptions.

use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use swagger_diff::{Diff, Source, SpecOptions, Specification};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "swagger-diff")]
#[command(about = "Check Swagger 2.0 API descriptions for backwards compatibility")]
#[command(version)]
struct Cli {
    /// Old API description: file path, URL (http:// or https://), or raw JSON/YAML
    old: String,

    /// New API description: file path, URL (http:// or https://), or raw JSON/YAML
    new: String,

    /// Generate a list of changes between <NEW> and <OLD>
    #[arg(long, short, conflicts_with = "incompatibilities")]
    changes: bool,

    /// Check <NEW> for backwards-compatibility with <OLD> (default)
    #[arg(long, short)]
    incompatibilities: bool,

    /// Output results as JSON (for automation)
    #[arg(long)]
    json: bool,

    /// Prefix endpoint paths with each document's basePath
    #[arg(long)]
    base_path: bool,

    /// Skip Swagger 2.0 meta-schema validation
    #[arg(long)]
    no_validate: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("swagger_diff=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run(cli: Cli) -> Result<(), u8> {
    let options = SpecOptions::new()
        .base_path(cli.base_path)
        .validate(!cli.no_validate);

    let old = load(&cli.old, "old", &options)?;
    let new = load(&cli.new, "new", &options)?;
    let diff = Diff::new(old, new);

    if cli.changes {
        let changes = diff.changes();
        if cli.json {
            print_json(&changes)?;
        } else {
            print!("{}", changes);
        }
        return Ok(());
    }

    let incompatibilities = diff.incompatibilities();
    let compatible = incompatibilities.is_empty();
    if cli.json {
        print_json(&serde_json::json!({
            "compatible": compatible,
            "incompatibilities": incompatibilities,
        }))?;
    } else {
        print!("{}", incompatibilities);
    }

    if compatible {
        Ok(())
    } else {
        Err(1)
    }
}

fn load(input: &str, which: &str, options: &SpecOptions) -> Result<Specification, u8> {
    Specification::load(Source::detect(input), options).map_err(|e| {
        eprintln!("Error loading {} API description: {}", which, e);
        e.exit_code() as u8
    })
}

fn print_json(value: &impl Serialize) -> Result<(), u8> {
    let output = serde_json::to_string_pretty(value).map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;
    println!("{}", output);
    Ok(())
}
