//! Storage provider trait for pluggable blob backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StorageEntry {
    /// Final path segment.
    pub name: String,
    /// Size in bytes (0 for directories).
    pub size_bytes: u64,
    /// Whether this is a directory.
    pub is_directory: bool,
}

/// A byte stream type used for reading blob contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for blob storage backends.
///
/// Paths are `/`-separated and relative to the provider root. Implementations
/// exist for the local filesystem and for process memory.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read a blob as a byte stream.
    async fn read(&self, path: &str) -> AppResult<ByteStream>;

    /// Read a blob into memory.
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes>;

    /// Write a blob atomically: readers see either no blob or the whole blob.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Delete a blob. Deleting a missing blob is not an error.
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Check whether a blob or directory exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;

    /// List the direct children of a directory. A missing directory lists as empty.
    async fn list(&self, path: &str) -> AppResult<Vec<StorageEntry>>;

    /// Create a directory (and any missing parents).
    async fn create_dir(&self, path: &str) -> AppResult<()>;
}
