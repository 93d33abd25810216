//! Rulehub - inspect a rule content hub and its local state
//!
//! Every invocation builds one [`Hub`] from the configuration file and
//! hands it to the selected subcommand.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use rulehub_core::HubConfig;

mod hub_cli;

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
    name = "rulehub",
    about = "Inspect the rule hub index and what is installed locally",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: hub_cli::HubCommand,

    /// Hub configuration file (defaults to the user config directory)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Log output format
    #[clap(long, default_value = "text", global = true)]
    log_format: LogFormat,
}

/// Initialize tracing with CLI flags
///
/// `RUST_LOG` directives are added on top of `--log-level`.
fn initialize_tracing(log_level: &LogLevel, log_format: &LogFormat) {
    let mut filter = EnvFilter::new(log_level.to_filter_directive());

    if let Ok(env) = std::env::var(EnvFilter::DEFAULT_ENV) {
        for directive in env.split(',').filter(|d| !d.is_empty()) {
            if let Ok(parsed) = directive.parse() {
                filter = filter.add_directive(parsed);
            }
        }
    }

    // logs go to stderr, stdout is reserved for command output
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

fn load_config(path: Option<PathBuf>) -> Result<HubConfig> {
    let path = match path {
        Some(path) => path,
        None => HubConfig::default_path().context("Failed to locate the hub configuration")?,
    };

    debug!("loading hub configuration from {}", path.display());

    HubConfig::load_from_path(&path)
        .with_context(|| format!("Failed to load hub configuration from {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, &cli.log_format);

    let config = load_config(cli.config)?;
    cli.command.execute(config)
}
