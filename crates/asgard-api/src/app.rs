//! Application builder: wires state, router, and middleware into an Axum app.

use std::path::Path;
use std::sync::Arc;

use axum::Router;

use asgard_auth::{AdminCredentialStore, AdminSessions, TokenStore};
use asgard_core::config::AppConfig;
use asgard_core::error::AppError;
use asgard_service::BackupGateway;
use asgard_storage::VersionStore;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Construct every service the handlers need from configuration.
pub async fn build_state(config: AppConfig) -> Result<AppState, AppError> {
    // ── Storage ──────────────────────────────────────────────────
    tracing::info!(provider = %config.storage.provider, "Initializing storage");
    let versions = Arc::new(VersionStore::from_config(&config).await?);
    tracing::info!(
        max_versions = versions.max_versions(),
        blocked_patterns = versions.policy().patterns().len(),
        "Version store ready"
    );
    let storage = Arc::clone(versions.provider());

    // ── Auth ─────────────────────────────────────────────────────
    let tokens = Arc::new(TokenStore::new(config.auth.token_bytes));
    let admins = Arc::new(AdminCredentialStore::new(&config.auth.admin_credentials_path));
    let admin_sessions = Arc::new(AdminSessions::new());

    // ── Gateway ──────────────────────────────────────────────────
    let gateway = Arc::new(BackupGateway::new(
        tokens,
        versions,
        config.storage.max_upload_size_bytes,
    ));

    Ok(AppState {
        config: Arc::new(config),
        gateway,
        storage,
        admins,
        admin_sessions,
    })
}

/// Runs the Asgard server until Ctrl+C.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Asgard Backup server...");

    create_data_directories(&config).await?;

    let addr = config.server.bind_address();
    let state = build_state(config).await?;

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Asgard server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Asgard server stopped");
    Ok(())
}

async fn create_data_directories(config: &AppConfig) -> Result<(), AppError> {
    let mut dirs = vec![config.storage.data_root.clone()];
    if let Some(parent) = Path::new(&config.auth.admin_credentials_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        dirs.push(parent.to_string_lossy().into_owned());
    }

    for dir in &dirs {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::configuration(format!("Failed to create dir '{dir}': {e}")))?;
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
