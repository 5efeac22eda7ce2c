//! codesync CLI - Command-line interface for codesync
//!
//! Provides commands for:
//! - Running an incremental sync pass of a project directory

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use codesync_core::config::Config;

mod commands;
mod output;

use commands::sync::SyncCommand;
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "codesync", version, about = "One-way incremental project sync")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload local changes of a project to the remote store
    Sync(SyncCommand),
}

impl Cli {
    /// Filter directive: `-v` count first, then the configured level
    fn log_filter(&self, config: &Config) -> String {
        match self.verbose {
            0 => config.logging.level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path);

    // Setup tracing
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter(&config)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    tracing::debug!(config_path = %config_path.display(), "Loaded configuration");

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Sync(cmd) => cmd.execute(&config, format).await,
    }
}
