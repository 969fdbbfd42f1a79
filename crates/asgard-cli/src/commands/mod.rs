//! CLI command definitions and dispatch.

pub mod admin;
pub mod client;
pub mod serve;

use clap::{Parser, Subcommand};

use asgard_core::config::AppConfig;
use asgard_core::error::AppError;

use crate::output::OutputFormat;

/// Asgard Backup: versioned personal file backup
#[derive(Debug, Parser)]
#[command(name = "asgard", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the Asgard server
    Serve(serve::ServeArgs),
    /// Store an administrator credential for the dashboard
    CreateAdmin(admin::CreateAdminArgs),
    /// Talk to a running server as a backup client
    Client(client::ClientArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.config).await,
            Commands::CreateAdmin(args) => admin::execute(args, &self.config).await,
            Commands::Client(args) => client::execute(args, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}
