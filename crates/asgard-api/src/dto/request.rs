//! Request DTOs.
//!
//! Query fields are optional so a missing parameter surfaces as a
//! `VALIDATION` error body instead of a bare extractor rejection.

use serde::Deserialize;

use asgard_core::error::AppError;

/// `POST /api/login?username=`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginQuery {
    /// Username to log in as.
    pub username: Option<String>,
}

/// `POST /api/check?filename=&filehash=`
#[derive(Debug, Clone, Deserialize)]
pub struct CheckQuery {
    /// Client filename.
    pub filename: Option<String>,
    /// Hex SHA-256 of the client's content.
    pub filehash: Option<String>,
}

/// `POST /api/restore?filename=&version=`
#[derive(Debug, Clone, Deserialize)]
pub struct RestoreQuery {
    /// Client filename.
    pub filename: Option<String>,
    /// Version id, `latest`, or absent for the newest.
    pub version: Option<String>,
}

/// Admin login form body.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminLoginForm {
    /// Admin username.
    pub username: String,
    /// Admin password.
    pub password: String,
}

/// Unwrap a required query parameter.
pub fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(format!("Missing query parameter '{name}'")))
}
