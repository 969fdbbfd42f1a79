//! Core type definitions used across the Asgard workspace.

pub mod hash;
pub mod user;
pub mod version;

use std::collections::BTreeMap;

pub use hash::ContentHash;
pub use user::Username;
pub use version::{PutOutcome, RestoredFile, VersionId, VersionSelector};

/// Per-user listing: filename to its retained versions in ascending order.
pub type FileListing = BTreeMap<String, Vec<VersionId>>;
