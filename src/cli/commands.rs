use crate::config::LoaderConfig;
use crate::document::Document;
use crate::loader::Loader;
use crate::logging::{init_logging, LogConfig};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};

/// Command-line interface for oas-resolver
#[derive(Parser, Debug)]
#[command(name = "oas-resolve")]
#[command(about = "Resolve $ref references in OpenAPI documents", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a document and print it
    Resolve {
        /// Path or URL of the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        spec: String,

        /// Allow references to other files and URLs
        #[arg(long, default_value_t = false)]
        external_refs: bool,

        /// Output encoding
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Resolve a document and print resolution statistics
    Check {
        /// Path or URL of the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        spec: String,

        /// Allow references to other files and URLs
        #[arg(long, default_value_t = false)]
        external_refs: bool,
    },
}

/// Encoding of the `resolve` output
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Parse arguments, install logging and run the selected command on stdout.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_env())?;
    let stdout = io::stdout();
    run(&cli, LoaderConfig::from_env(), &mut stdout.lock())
}

/// Runs `cli` with `config` as the loader baseline, writing to `out`.
pub fn run(cli: &Cli, config: LoaderConfig, out: &mut impl Write) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Resolve {
            spec,
            external_refs,
            format,
        } => {
            let (document, _) = load(spec, *external_refs, config)?;
            match format {
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut *out, &document)?;
                    writeln!(out)?;
                }
                OutputFormat::Yaml => serde_yaml::to_writer(&mut *out, &document)?,
            }
        }
        Commands::Check {
            spec,
            external_refs,
        } => {
            let (_, loader) = load(spec, *external_refs, config)?;
            let stats = loader.last_stats().unwrap_or_default();
            serde_json::to_writer_pretty(&mut *out, &stats)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn load(spec: &str, external_refs: bool, config: LoaderConfig) -> anyhow::Result<(Document, Loader)> {
    let allowed = config.external_refs_allowed || external_refs;
    let loader = Loader::from_config(config).allow_external_refs(allowed);
    let document = if spec.contains("://") {
        loader.load_from_uri(spec)
    } else {
        loader.load_from_file(spec)
    }
    .with_context(|| format!("failed to resolve {spec}"))?;
    Ok((document, loader))
}
