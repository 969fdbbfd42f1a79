//! Core traits defined in `asgard-core` and implemented by other crates.

pub mod storage;
pub mod version;

pub use storage::{ByteStream, StorageEntry, StorageProvider};
pub use version::VersionRepository;
