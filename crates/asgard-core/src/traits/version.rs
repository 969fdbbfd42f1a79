//! The versioned storage boundary.
//!
//! The backup gateway only talks to this trait, so the mechanism behind it
//! (directory tree, in-memory map, object store) can change without touching
//! the gateway.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;
use crate::types::{ContentHash, FileListing, PutOutcome, RestoredFile, Username, VersionSelector};

/// Per-user, per-filename version history with dedup and retention.
#[async_trait]
pub trait VersionRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Create the user's namespace if it does not exist yet.
    async fn ensure_user(&self, user: &Username) -> AppResult<()>;

    /// Store `content` as a new version of `filename` unless a retained
    /// version already has the same hash, then prune to the retention bound.
    async fn put(&self, user: &Username, filename: &str, content: Bytes) -> AppResult<PutOutcome>;

    /// Whether any retained version of `filename` has the given hash.
    async fn has(&self, user: &Username, filename: &str, hash: &ContentHash) -> AppResult<bool>;

    /// All files of the user with at least one version, versions ascending.
    async fn list(&self, user: &Username) -> AppResult<FileListing>;

    /// Read one version of `filename`.
    async fn get(
        &self,
        user: &Username,
        filename: &str,
        selector: &VersionSelector,
    ) -> AppResult<RestoredFile>;
}
