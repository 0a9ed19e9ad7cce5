//! qtpods - git submodule based dependency management for qmake projects
//!
//! Main entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use qtpods_core::config::ConfigStore;

mod pods_cli;
mod source_cli;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Log output formats
#[derive(Debug, Clone, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[clap(
    name = "qtpods",
    about = "Manage qmake project dependencies as git submodules",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Repository to operate on
    #[clap(long, short = 'C', default_value = ".", global = true)]
    repo: PathBuf,

    /// Override the configuration file path
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Set log level
    #[clap(long, default_value = "info", global = true)]
    log_level: LogLevel,

    /// Log output format
    #[clap(long, default_value = "text", global = true)]
    log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[clap(flatten)]
    Pods(pods_cli::PodsCommand),

    /// Manage catalog sources
    Source {
        #[clap(subcommand)]
        command: source_cli::SourceCommand,
    },
}

/// Initialize tracing with CLI flags
fn initialize_tracing(log_level: &LogLevel, log_format: &LogFormat) {
    // RUST_LOG wins over --log-level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    // Logs go to stderr; stdout carries command output
    match log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ConfigStore> {
    match path {
        Some(path) => ConfigStore::load_from_path(path),
        None => ConfigStore::load(),
    }
    .context("Failed to load qtpods configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, &cli.log_format);

    let config = load_config(cli.config)?;

    match cli.command {
        Command::Pods(command) => command.execute(&cli.repo, config.config()).await,
        Command::Source { command } => command.execute(config),
    }
}
