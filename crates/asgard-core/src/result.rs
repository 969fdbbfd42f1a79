//! Convenience result type alias for Asgard Backup.

use crate::error::AppError;

/// A specialized `Result` type for Asgard operations.
pub type AppResult<T> = Result<T, AppError>;
