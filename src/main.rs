//! Asgard Backup Server
//!
//! Main entry point: loads configuration, initializes logging, and serves
//! the backup API until Ctrl+C.

use asgard_core::config::AppConfig;
use asgard_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    asgard_api::init_logging(&config.logging);
    tracing::info!(
        "Starting Asgard Backup v{} (storage: {}, max_versions: {})",
        env!("CARGO_PKG_VERSION"),
        config.storage.provider,
        config.retention.max_versions
    );

    if let Err(e) = asgard_api::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file, environment overlay, and `ASGARD__*` variables
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("ASGARD_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

    let env = std::env::var("ASGARD_ENV").unwrap_or_else(|_| "development".to_string());
    let env_config_path = format!("config/{}.toml", env);

    AppConfig::load_layered(&config_path, Some(&env_config_path))
}
