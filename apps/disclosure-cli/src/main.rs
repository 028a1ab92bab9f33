//! Disclosure parser CLI
//!
//! Runs the intake-and-classification pipeline over financial-disclosure
//! PDFs, one file at a time or a whole directory.
//!
//! - `parse`: classify a single document (optionally with an AI summary)
//! - `batch`: classify every PDF in a directory
//! - `standards`: list the supported form types and their steps
//! - `status`: probe the malware scanner and the summarization service

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pipeline_core::{Pipeline, PipelineConfig};
use tracing::{debug, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "disclosure-cli")]
#[command(about = "Classify financial-disclosure PDFs against accounting standards")]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full pipeline on one PDF
    Parse {
        file: PathBuf,

        /// Standard to classify against (asc606, ifrs15, asc450, ...)
        #[arg(short, long)]
        form_type: String,

        /// Also request a summary from the summarization service
        #[arg(short, long)]
        summarize: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Process every PDF in a directory, continuing past failures
    Batch {
        dir: PathBuf,

        #[arg(short, long)]
        form_type: String,
    },

    /// List supported form types
    Standards,

    /// Probe external services and print their availability
    Status,
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = PipelineConfig::load(args.config.as_deref())?;

    let log_level = if args.debug || config.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let file_layer = match &config.logging.file {
        Some(path) => Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    debug!("Configuration: {:?}", config.paths);

    let pipeline = Pipeline::from_config(&config)?;

    match args.command {
        Command::Parse {
            file,
            form_type,
            summarize,
            json,
        } => commands::parse(&pipeline, &file, &form_type, summarize, json),
        Command::Batch { dir, form_type } => commands::batch(&pipeline, &dir, &form_type),
        Command::Standards => {
            print!("{}", commands::format_standards(pipeline.engine()));
            Ok(ExitCode::SUCCESS)
        }
        Command::Status => {
            let status = pipeline.probe_services();
            println!("scanner: {}", status.scanner);
            println!("summarizer: {}", status.summarizer);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Open `path` for appending, creating it and its directory if needed
fn open_log_file(path: &Path) -> anyhow::Result<fs::File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}
