//! # asgard-core
//!
//! Core crate for Asgard Backup. Contains the storage traits, configuration
//! schemas, typed identifiers for users, files, versions and content hashes,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other Asgard crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
