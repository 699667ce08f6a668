//! # Command Line Interface
//!
//! `meshguard validate` checks configuration documents and exits non-zero when
//! any of them is invalid; `meshguard kinds` lists the registered resource
//! kinds.

pub mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::config::{AppConfig, OutputFormat};
use crate::document::load_documents;
use crate::observability::{init_logging, log_config_info};
use crate::validation::ConfigDescriptor;
use output::{render_kinds, DocumentReport, ValidationReport};

#[derive(Parser)]
#[command(name = "meshguard")]
#[command(about = "Validate service-mesh configuration before it reaches the control plane")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (defaults to ./meshguard.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate configuration documents
    Validate {
        /// YAML or JSON files holding one or more documents
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Report format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Namespace for documents of namespaced kinds that carry none
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// List registered resource kinds
    Kinds {
        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
}

/// Run CLI commands
pub fn run_cli() -> anyhow::Result<ExitCode> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let cli = Cli::parse();
    let config = AppConfig::load_from(cli.config.as_deref()).context("Failed to load settings")?;
    init_logging(&config.observability, cli.verbose).context("Failed to initialise logging")?;
    log_config_info(&config);

    match cli.command {
        Commands::Validate { files, format, namespace } => {
            let format = format.unwrap_or(config.output.format);
            let namespace = namespace.unwrap_or_else(|| config.output.default_namespace.clone());
            let report = validate_files(&files, &namespace);
            println!("{}", report.render(format)?);

            if report.is_valid() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Kinds { format } => {
            let descriptor = ConfigDescriptor::builtin();
            descriptor.validate().map_err(|violations| {
                anyhow::anyhow!("built-in descriptor is inconsistent: {}", violations)
            })?;
            println!("{}", render_kinds(&descriptor, format.unwrap_or(config.output.format))?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Check every document in `files`. Documents of namespaced kinds without a
/// namespace are placed in `default_namespace` when it is non-empty.
pub fn validate_files(files: &[PathBuf], default_namespace: &str) -> ValidationReport {
    let mut report = ValidationReport::default();

    for path in files {
        let source = path.display().to_string();
        let documents = match load_documents(path) {
            Ok(documents) => documents,
            Err(e) => {
                warn!(source = %source, error = %e, "failed to read configuration file");
                report.push(DocumentReport::unreadable(&source, e));
                continue;
            }
        };

        for (i, mut document) in documents.into_iter().enumerate() {
            if document.namespace.is_empty() && !default_namespace.is_empty() {
                let cluster_scoped =
                    document.resource_kind().map(|kind| kind.is_cluster_scoped()).unwrap_or(false);
                if !cluster_scoped {
                    document.namespace = default_namespace.to_string();
                }
            }
            report.push(DocumentReport::check(&source, i + 1, &document));
        }
    }

    info!(valid = report.valid, invalid = report.invalid, "validation finished");
    report
}
