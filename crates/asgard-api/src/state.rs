//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use asgard_auth::{AdminCredentialStore, AdminSessions};
use asgard_core::config::AppConfig;
use asgard_core::traits::storage::StorageProvider;
use asgard_service::BackupGateway;

/// Shared application state, cloned into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Login, upload, check, list, and restore.
    pub gateway: Arc<BackupGateway>,
    /// Blob provider behind the version store, for health checks.
    pub storage: Arc<dyn StorageProvider>,
    /// Administrator credential file.
    pub admins: Arc<AdminCredentialStore>,
    /// Admin dashboard sessions.
    pub admin_sessions: Arc<AdminSessions>,
}
