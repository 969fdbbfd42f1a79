//! Route definitions for the Asgard HTTP API.
//!
//! Backup endpoints are mounted under `/api`, the dashboard under `/admin`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Multipart framing allowance on top of the configured upload limit.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state
        .config
        .storage
        .max_upload_size_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    let api_routes = Router::new()
        .merge(backup_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .merge(admin_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors::build_cors_layer(&state.config.server.cors))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Login, upload, check, list, restore
fn backup_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/upload", post(handlers::backup::upload))
        .route("/check", post(handlers::backup::check))
        .route("/list", get(handlers::backup::list))
        .route("/restore", post(handlers::backup::restore))
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Admin dashboard pages
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(handlers::admin::dashboard))
        .route(
            "/admin/login",
            get(handlers::admin::login_form).post(handlers::admin::login),
        )
        .route("/admin/logout", get(handlers::admin::logout))
}
