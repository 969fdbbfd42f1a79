//! # asgard-storage
//!
//! Versioned blob storage for Asgard Backup. Holds the content hasher, the
//! filename policy, per-file write locks, the blob providers (local
//! filesystem and memory), and the [`VersionStore`] that ties them together.

pub mod hasher;
pub mod locks;
pub mod manager;
pub mod path_policy;
pub mod providers;
pub mod version_store;

pub use hasher::ContentHasher;
pub use locks::KeyedLocks;
pub use manager::open_provider;
pub use path_policy::{PathPolicy, SafeFileName};
pub use version_store::VersionStore;
