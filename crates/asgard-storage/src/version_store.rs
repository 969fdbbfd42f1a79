//! Per-user, per-file version history on top of a [`StorageProvider`].
//!
//! Layout: `<user>/<filename>/<version-id>`, one blob per version. The
//! version id sorts chronologically, so listing a file directory yields its
//! history. Writes to one file hold a [`KeyedLocks`] entry from the
//! duplicate check until pruning finishes.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use asgard_core::config::AppConfig;
use asgard_core::error::{AppError, ErrorKind};
use asgard_core::result::AppResult;
use asgard_core::traits::storage::StorageProvider;
use asgard_core::traits::version::VersionRepository;
use asgard_core::types::{
    ContentHash, FileListing, PutOutcome, RestoredFile, Username, VersionId, VersionSelector,
};

use crate::hasher::{hash_bytes, hash_stream};
use crate::locks::KeyedLocks;
use crate::manager::open_provider;
use crate::path_policy::{PathPolicy, SafeFileName};

/// Source of the current time for new version ids.
pub type Clock = fn() -> DateTime<Utc>;

/// Version store backed by a blob provider.
#[derive(Debug)]
pub struct VersionStore {
    provider: Arc<dyn StorageProvider>,
    policy: PathPolicy,
    max_versions: usize,
    locks: KeyedLocks<(Username, SafeFileName)>,
    clock: Clock,
}

impl VersionStore {
    /// Create a store keeping at most `max_versions` per file.
    pub fn new(provider: Arc<dyn StorageProvider>, policy: PathPolicy, max_versions: usize) -> Self {
        Self {
            provider,
            policy,
            max_versions: max_versions.max(1),
            locks: KeyedLocks::new(),
            clock: Utc::now,
        }
    }

    /// Open the configured provider and build a store over it.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        let provider = open_provider(&config.storage).await?;
        Ok(Self::new(
            provider,
            PathPolicy::from_config(&config.path_policy),
            config.retention.max_versions,
        ))
    }

    /// Replace the clock used to stamp new versions.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// The underlying provider.
    pub fn provider(&self) -> &Arc<dyn StorageProvider> {
        &self.provider
    }

    /// The retention bound.
    pub fn max_versions(&self) -> usize {
        self.max_versions
    }

    /// The filename policy.
    pub fn policy(&self) -> &PathPolicy {
        &self.policy
    }

    fn file_dir(user: &Username, file: &SafeFileName) -> String {
        format!("{user}/{file}")
    }

    fn version_path(user: &Username, file: &SafeFileName, version: &VersionId) -> String {
        format!("{user}/{file}/{version}")
    }

    /// Retained version ids of one file, ascending. Entries whose names are
    /// not version ids are skipped.
    async fn version_ids(&self, user: &Username, file: &SafeFileName) -> AppResult<Vec<VersionId>> {
        let mut ids: Vec<VersionId> = self
            .provider
            .list(&Self::file_dir(user, file))
            .await?
            .into_iter()
            .filter(|e| !e.is_directory)
            .filter_map(|e| e.name.parse().ok())
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Hash one stored version. `None` if it disappeared meanwhile.
    async fn stored_hash(
        &self,
        user: &Username,
        file: &SafeFileName,
        version: &VersionId,
    ) -> AppResult<Option<ContentHash>> {
        let path = Self::version_path(user, file, version);
        let stream = match self.provider.read(&path).await {
            Ok(stream) => stream,
            Err(e) if e.is(ErrorKind::NotFound) => return Ok(None),
            Err(e) => return Err(e),
        };
        hash_stream(stream).await.map(Some)
    }

    /// First retained version whose content hashes to `hash`.
    async fn find_by_hash(
        &self,
        user: &Username,
        file: &SafeFileName,
        hash: &ContentHash,
    ) -> AppResult<Option<VersionId>> {
        for version in self.version_ids(user, file).await? {
            if self.stored_hash(user, file, &version).await?.as_ref() == Some(hash) {
                return Ok(Some(version));
            }
        }
        Ok(None)
    }

    /// Delete the oldest versions until at most `max_versions` remain.
    async fn prune(&self, user: &Username, file: &SafeFileName) -> AppResult<usize> {
        let ids = self.version_ids(user, file).await?;
        let excess = ids.len().saturating_sub(self.max_versions);
        for version in &ids[..excess] {
            self.provider
                .delete(&Self::version_path(user, file, version))
                .await?;
            debug!(user = %user, file = %file, version = %version, "Evicted version");
        }
        Ok(excess)
    }
}

#[async_trait]
impl VersionRepository for VersionStore {
    async fn ensure_user(&self, user: &Username) -> AppResult<()> {
        self.provider.create_dir(user.as_str()).await
    }

    async fn put(&self, user: &Username, filename: &str, content: Bytes) -> AppResult<PutOutcome> {
        let file = self.policy.sanitize(filename)?;
        let hash = hash_bytes(&content);

        let _guard = self.locks.lock((user.clone(), file.clone())).await;

        if let Some(existing) = self.find_by_hash(user, &file, &hash).await? {
            info!(
                user = %user,
                file = %file,
                version = %existing,
                hash = %hash,
                "Duplicate upload ignored"
            );
            return Ok(PutOutcome::Duplicate);
        }

        let ids = self.version_ids(user, &file).await?;
        let version = VersionId::next_after((self.clock)(), ids.last());
        let size = content.len();
        self.provider
            .write(&Self::version_path(user, &file, &version), content)
            .await?;

        let evicted = match self.prune(user, &file).await {
            Ok(n) => n,
            Err(e) => {
                warn!(user = %user, file = %file, error = %e, "Failed to prune old versions");
                return Err(e);
            }
        };

        info!(
            user = %user,
            file = %file,
            version = %version,
            bytes = size,
            evicted,
            "Stored new version"
        );
        Ok(PutOutcome::Uploaded(version))
    }

    async fn has(&self, user: &Username, filename: &str, hash: &ContentHash) -> AppResult<bool> {
        let file = self.policy.sanitize(filename)?;
        Ok(self.find_by_hash(user, &file, hash).await?.is_some())
    }

    async fn list(&self, user: &Username) -> AppResult<FileListing> {
        let mut listing = FileListing::new();
        for entry in self.provider.list(user.as_str()).await? {
            if !entry.is_directory {
                continue;
            }
            let Ok(file) = self.policy.sanitize(&entry.name) else {
                continue;
            };
            let ids = self.version_ids(user, &file).await?;
            if !ids.is_empty() {
                listing.insert(file.into_inner(), ids);
            }
        }
        Ok(listing)
    }

    async fn get(
        &self,
        user: &Username,
        filename: &str,
        selector: &VersionSelector,
    ) -> AppResult<RestoredFile> {
        let file = self.policy.sanitize(filename)?;
        let ids = self.version_ids(user, &file).await?;

        let version = match selector {
            VersionSelector::Latest => ids
                .last()
                .copied()
                .ok_or_else(|| AppError::not_found(format!("No versions of '{file}'")))?,
            VersionSelector::Exact(wanted) => {
                if !ids.contains(wanted) {
                    return Err(AppError::not_found(format!(
                        "Version '{wanted}' of '{file}' not found"
                    )));
                }
                *wanted
            }
        };

        let data = self
            .provider
            .read_bytes(&Self::version_path(user, &file, &version))
            .await?;

        debug!(user = %user, file = %file, version = %version, "Restored version");
        Ok(RestoredFile {
            filename: file.into_inner(),
            version,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{LocalStorageProvider, MemoryStorageProvider};
    use chrono::TimeZone;

    fn frozen() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn alice() -> Username {
        Username::parse("alice").unwrap()
    }

    fn memory_store(max_versions: usize) -> VersionStore {
        VersionStore::new(
            Arc::new(MemoryStorageProvider::new()),
            PathPolicy::default(),
            max_versions,
        )
    }

    #[tokio::test]
    async fn test_put_then_get_latest() {
        let store = memory_store(4);
        let outcome = store
            .put(&alice(), "/home/alice/notes.txt", Bytes::from("v1"))
            .await
            .unwrap();
        assert!(!outcome.is_duplicate());

        let restored = store
            .get(&alice(), "notes.txt", &VersionSelector::Latest)
            .await
            .unwrap();
        assert_eq!(restored.filename, "notes.txt");
        assert_eq!(restored.data, Bytes::from("v1"));
        assert_eq!(Some(&restored.version), outcome.version());
    }

    #[tokio::test]
    async fn test_duplicate_against_any_retained_version() {
        let store = memory_store(4).with_clock(frozen);
        store.put(&alice(), "a.txt", Bytes::from("one")).await.unwrap();
        store.put(&alice(), "a.txt", Bytes::from("two")).await.unwrap();

        let again = store.put(&alice(), "a.txt", Bytes::from("one")).await.unwrap();
        assert_eq!(again, PutOutcome::Duplicate);
        assert_eq!(store.list(&alice()).await.unwrap()["a.txt"].len(), 2);
    }

    #[tokio::test]
    async fn test_same_second_versions_are_distinct() {
        let store = memory_store(4).with_clock(frozen);
        let a = store.put(&alice(), "a.txt", Bytes::from("1")).await.unwrap();
        let b = store.put(&alice(), "a.txt", Bytes::from("2")).await.unwrap();

        assert_eq!(a.version().unwrap().to_string(), "20240101120000-000");
        assert_eq!(b.version().unwrap().to_string(), "20240101120000-001");
    }

    #[tokio::test]
    async fn test_retention_evicts_oldest() {
        let store = memory_store(4).with_clock(frozen);
        let mut versions = Vec::new();
        for i in 0..6 {
            let outcome = store
                .put(&alice(), "a.txt", Bytes::from(format!("content {i}")))
                .await
                .unwrap();
            versions.push(*outcome.version().unwrap());
        }

        let listing = store.list(&alice()).await.unwrap();
        assert_eq!(listing["a.txt"], versions[2..]);

        let err = store
            .get(&alice(), "a.txt", &VersionSelector::Exact(versions[0]))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));

        // Evicted content is no longer a duplicate.
        assert!(
            !store
                .has(&alice(), "a.txt", &hash_bytes(b"content 0"))
                .await
                .unwrap()
        );
        let back = store
            .put(&alice(), "a.txt", Bytes::from("content 0"))
            .await
            .unwrap();
        assert!(!back.is_duplicate());
    }

    #[tokio::test]
    async fn test_has_and_unsafe_path() {
        let store = memory_store(4);
        store.put(&alice(), "a.txt", Bytes::from("x")).await.unwrap();

        assert!(store.has(&alice(), "a.txt", &hash_bytes(b"x")).await.unwrap());
        assert!(!store.has(&alice(), "a.txt", &hash_bytes(b"y")).await.unwrap());
        assert!(!store.has(&alice(), "b.txt", &hash_bytes(b"x")).await.unwrap());

        let err = store
            .put(&alice(), "C:\\Windows\\System32.dll", Bytes::from("x"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::UnsafePath));
        assert!(store.list(&alice()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = memory_store(4);
        let bob = Username::parse("bob").unwrap();
        store.put(&alice(), "a.txt", Bytes::from("x")).await.unwrap();

        assert!(store.list(&bob).await.unwrap().is_empty());
        let err = store
            .get(&bob, "a.txt", &VersionSelector::Latest)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_concurrent_puts_keep_bound() {
        let store = Arc::new(memory_store(3).with_clock(frozen));
        let mut handles = Vec::new();
        for i in 0..10 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .put(&alice(), "a.txt", Bytes::from(format!("{i}")))
                    .await
                    .unwrap()
            }));
        }
        let mut versions = Vec::new();
        for handle in handles {
            versions.push(*handle.await.unwrap().version().unwrap());
        }
        versions.sort();
        versions.dedup();
        assert_eq!(versions.len(), 10);
        assert_eq!(store.list(&alice()).await.unwrap()["a.txt"].len(), 3);
    }

    #[tokio::test]
    async fn test_local_layout_and_stray_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(tmp.path().to_str().unwrap())
            .await
            .unwrap();
        let store = VersionStore::new(Arc::new(provider), PathPolicy::default(), 4);
        store.ensure_user(&alice()).await.unwrap();

        let outcome = store.put(&alice(), "a.txt", Bytes::from("x")).await.unwrap();
        let version = outcome.version().unwrap();
        assert!(
            tmp.path()
                .join("alice")
                .join("a.txt")
                .join(version.to_string())
                .is_file()
        );

        std::fs::write(tmp.path().join("alice/a.txt/junk"), b"junk").unwrap();
        std::fs::write(tmp.path().join("alice/stray.txt"), b"stray").unwrap();
        std::fs::create_dir(tmp.path().join("alice/empty")).unwrap();

        let listing = store.list(&alice()).await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing["a.txt"], vec![*version]);
    }
}
