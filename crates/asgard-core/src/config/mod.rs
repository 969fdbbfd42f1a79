//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field carries a serde default so an empty file (or no
//! file at all) yields a runnable configuration.

pub mod app;
pub mod auth;
pub mod logging;
pub mod policy;
pub mod storage;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::logging::{LogFormat, LoggingConfig};
pub use self::policy::{DEFAULT_MAX_VERSIONS, PathPolicyConfig, RetentionConfig};
pub use self::storage::{LocalStorageConfig, StorageConfig, StorageProviderKind};

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (base file + environment overlay + `ASGARD__*`
/// environment variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Blob storage settings.
    pub storage: StorageConfig,
    /// Version retention settings.
    pub retention: RetentionConfig,
    /// Filename denylist settings.
    pub path_policy: PathPolicyConfig,
    /// Token and admin credential settings.
    pub auth: AuthConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file plus `ASGARD__*` environment variables.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load(path: &str) -> Result<Self, AppError> {
        Self::load_layered(path, None)
    }

    /// Load a base TOML file, an optional overlay file, and environment variables.
    ///
    /// Later sources win. Environment variables use `__` as the section
    /// separator, e.g. `ASGARD__SERVER__PORT=9000`.
    pub fn load_layered(path: &str, overlay: Option<&str>) -> Result<Self, AppError> {
        let mut builder =
            config::Config::builder().add_source(config::File::with_name(path).required(false));

        if let Some(overlay) = overlay {
            builder = builder.add_source(config::File::with_name(overlay).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("ASGARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would break the storage invariants.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.retention.max_versions == 0 {
            return Err(AppError::configuration(
                "retention.max_versions must be at least 1",
            ));
        }
        if self.auth.token_bytes < 8 {
            return Err(AppError::configuration(
                "auth.token_bytes must be at least 8",
            ));
        }
        if self.storage.max_upload_size_bytes == 0 {
            return Err(AppError::configuration(
                "storage.max_upload_size_bytes must be positive",
            ));
        }
        Ok(())
    }
}
