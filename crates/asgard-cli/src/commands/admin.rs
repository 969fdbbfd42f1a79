//! Administrator credential setup.

use clap::Args;

use asgard_auth::AdminCredentialStore;
use asgard_core::error::AppError;

use crate::output;

/// Arguments for the create-admin command
#[derive(Debug, Args)]
pub struct CreateAdminArgs {
    /// Admin username
    pub username: String,

    /// Password (will prompt if not provided)
    #[arg(short, long)]
    pub password: Option<String>,
}

/// Execute the create-admin command
pub async fn execute(args: &CreateAdminArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let store = AdminCredentialStore::new(&config.auth.admin_credentials_path);

    let password = match &args.password {
        Some(p) => p.clone(),
        None => dialoguer::Password::new()
            .with_prompt("Admin password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {}", e)))?,
    };

    let admin = store.create_admin(&args.username, &password).await?;

    output::print_success(&format!("Admin '{}' created", admin));
    output::print_kv("Credentials file", &store.path().display().to_string());
    Ok(())
}
