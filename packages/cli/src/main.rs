//! Formsmith Command Line
//!
//! File based front end for the field-tree engine.
//!
//! # Usage
//!
//! ```bash
//! # Import a JSON Schema (or a schema + uischema document) into a field tree
//! formsmith import schema.json --out form-config.json
//!
//! # Derive schema, presentation schema and default data from an export
//! formsmith derive form-config.json
//!
//! # Export one of the bundled samples
//! formsmith sample product-order
//!
//! # List the bundled samples
//! formsmith samples
//! ```
//!
//! # Environment Variables
//!
//! - `FORMSMITH_DEDUPE_WINDOW_MS`: duplicate insert window (default: 100)
//! - `FORMSMITH_EXPORT_STEM`: export file name stem (default: "form")
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use formsmith_core::config::DesignerConfig;
use formsmith_core::models::sample_schemas;
use formsmith_core::services::FormDesigner;

#[derive(Parser)]
#[command(name = "formsmith", version, about = "Form schema designer")]
struct Cli {
    /// Designer configuration (JSON); environment overrides still apply
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a schema or schema document and write the export document
    Import {
        input: PathBuf,
        /// Output file; `-` for stdout, defaults to `<stem>-config.json`
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print schema, presentation schema and default data for an input
    Derive { input: PathBuf },
    /// Write the export document for a bundled sample
    Sample {
        id: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the bundled samples
    Samples,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.cmd {
        Command::Import { input, out } => {
            let mut designer = FormDesigner::new(config);
            let text = read_input(&input)?;
            designer
                .import_text(&text)
                .with_context(|| format!("failed to import {}", input.display()))?;
            write_document(&mut designer, out)
        }
        Command::Derive { input } => {
            let mut designer = FormDesigner::new(config);
            let text = read_input(&input)?;
            designer
                .import_text(&text)
                .with_context(|| format!("failed to import {}", input.display()))?;

            let state = designer.form_state();
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, &state)?;
            writeln!(handle)?;
            Ok(())
        }
        Command::Sample { id, out } => {
            let mut designer = FormDesigner::new(config);
            designer.load_sample(&id)?;
            write_document(&mut designer, out)
        }
        Command::Samples => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            for sample in sample_schemas() {
                writeln!(
                    handle,
                    "{:<26} {} [{}]",
                    sample.id,
                    sample.name,
                    sample.tags.join(", ")
                )?;
            }
            Ok(())
        }
    }
}

/// Defaults (or the config file) with environment overrides, validated
fn load_config(path: Option<&Path>) -> Result<DesignerConfig> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => DesignerConfig::default(),
    };
    config.apply_overrides(|name| std::env::var(name).ok());
    config.validate().map_err(|e| anyhow!("invalid configuration: {}", e))?;
    Ok(config)
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_document(designer: &mut FormDesigner, out: Option<PathBuf>) -> Result<()> {
    let path = out.unwrap_or_else(|| PathBuf::from(designer.export_file_name()));
    if path.as_os_str() == "-" {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        designer.write_export(&mut handle)?;
        writeln!(handle)?;
        return Ok(());
    }

    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    designer.write_export(file)?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}
