//! # asgard-service
//!
//! Business logic for Asgard Backup. The [`BackupGateway`] resolves client
//! tokens and applies the per-operation checks before delegating to the
//! version store.
//!
//! Dependencies are provided at construction time via `Arc` references.

pub mod context;
pub mod gateway;

pub use context::RequestContext;
pub use gateway::{BackupGateway, LoginGrant, UploadRequest};
