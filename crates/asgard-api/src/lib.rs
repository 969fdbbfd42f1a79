//! # asgard-api
//!
//! HTTP API layer for Asgard Backup built on Axum.
//!
//! Provides the `/api` backup endpoints, the `/admin` dashboard, the
//! `X-Token` extractor, DTOs, error mapping, and request logging.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod telemetry;

pub use app::{build_app, build_state, run_server};
pub use error::ApiError;
pub use state::AppState;
pub use telemetry::init_logging;
