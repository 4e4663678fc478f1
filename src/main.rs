//! NCM Report CLI - Command-line interface for compliance report generation
//!
//! CDD Principle: Application Layer - CLI coordinates user interactions with domain services
//! - Translates flags to an envelope source, a schema variant, and an output path
//! - Handles external concerns like process exit codes and terminal output
//! - Attaches stage-identifying context to errors before they reach the user

use anyhow::Context;
use clap::Parser;
use ncm_report::{
    decode_records, default_output_path, flatten_all, read_envelope_file,
    write_violations_to_file, SchemaVariant, SwisClient, SwisConfig,
};
use std::path::PathBuf;
use std::process;

/// NCM Report - compliance violation reporting
#[derive(Parser)]
#[command(name = "ncm-report")]
#[command(version)]
#[command(about = "Flattens network-device compliance violations into a CSV report")]
#[command(
    long_about = "NCM Report queries cached policy results from the SolarWinds Information Service (or reads a previously exported JSON file) and flattens each device's embedded compliance detail into one CSV row per rule pattern."
)]
struct Cli {
    /// Input JSON file (queries the Information Service when omitted)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Name of rule to target (default: all rules)
    #[arg(short, long)]
    rule: Option<String>,

    /// Emit the minimal two-column report (Node Name, Interface Name)
    #[arg(long)]
    interfaces_only: bool,

    /// Output CSV path (default: timestamped file in the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let bytes = if let Some(path) = &cli.file {
        read_envelope_file(path).context("failed to read input file")?
    } else {
        let config = SwisConfig::from_env()?;
        let client = SwisClient::new(config)?;
        client
            .query_violations(cli.rule.as_deref())
            .context("failed to query compliance results")?
    };

    let variant = if cli.interfaces_only {
        SchemaVariant::InterfaceOnly
    } else {
        SchemaVariant::Full
    };

    let records = decode_records(&bytes).context("decoding compliance results")?;

    let violations = flatten_all(&records, variant).context("flattening violations")?;

    println!("found {} violations", violations.len());

    let output_path = cli.output.unwrap_or_else(default_output_path);
    write_violations_to_file(&output_path, &violations, variant)
        .context("failed to save violations")?;

    println!("wrote {}", output_path.display());

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}
