//! Token and administrator authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Random bytes per client token (rendered as twice as many hex chars).
    #[serde(default = "default_token_bytes")]
    pub token_bytes: usize,
    /// JSON file holding administrator password hashes.
    #[serde(default = "default_admin_credentials_path")]
    pub admin_credentials_path: String,
    /// Name of the admin session cookie.
    #[serde(default = "default_admin_cookie")]
    pub admin_session_cookie: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_bytes: default_token_bytes(),
            admin_credentials_path: default_admin_credentials_path(),
            admin_session_cookie: default_admin_cookie(),
        }
    }
}

fn default_token_bytes() -> usize {
    16
}

fn default_admin_credentials_path() -> String {
    "./data/admins.json".to_string()
}

fn default_admin_cookie() -> String {
    "asgard_admin".to_string()
}
