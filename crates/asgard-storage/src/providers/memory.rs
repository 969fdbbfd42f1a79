//! In-memory storage provider.
//!
//! Holds the same `/`-separated tree as the local provider inside a map.
//! Contents vanish with the process; used by tests and `provider = "memory"`.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use asgard_core::error::AppError;
use asgard_core::result::AppResult;
use asgard_core::traits::storage::{ByteStream, StorageEntry, StorageProvider};

#[derive(Debug, Default)]
struct Tree {
    files: BTreeMap<String, Bytes>,
    dirs: BTreeSet<String>,
}

impl Tree {
    fn add_dir_with_parents(&mut self, dir: &str) {
        let mut current = String::new();
        for segment in dir.split('/') {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);
            self.dirs.insert(current.clone());
        }
    }
}

/// Storage provider backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStorageProvider {
    tree: RwLock<Tree>,
}

impl MemoryStorageProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub async fn blob_count(&self) -> usize {
        self.tree.read().await.files.len()
    }
}

/// Normalize to `a/b/c` with no empty segments.
fn normalize(path: &str) -> AppResult<String> {
    let mut segments = Vec::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." {
            return Err(AppError::unsafe_path(format!(
                "Storage path escapes root: {path}"
            )));
        }
        segments.push(segment);
    }
    Ok(segments.join("/"))
}

fn parent_of(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(parent, _)| parent)
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn read(&self, path: &str) -> AppResult<ByteStream> {
        let data = self.read_bytes(path).await?;
        Ok(Box::pin(futures::stream::once(async move {
            Ok::<_, std::io::Error>(data)
        })))
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let key = normalize(path)?;
        self.tree
            .read()
            .await
            .files
            .get(&key)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("File not found: {path}")))
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let key = normalize(path)?;
        if key.is_empty() {
            return Err(AppError::validation("Cannot write to the storage root"));
        }
        let mut tree = self.tree.write().await;
        if let Some(parent) = parent_of(&key) {
            tree.add_dir_with_parents(parent);
        }
        tree.files.insert(key, data);
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let key = normalize(path)?;
        self.tree.write().await.files.remove(&key);
        Ok(())
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        let key = normalize(path)?;
        if key.is_empty() {
            return Ok(true);
        }
        let tree = self.tree.read().await;
        Ok(tree.files.contains_key(&key) || tree.dirs.contains(&key))
    }

    async fn list(&self, path: &str) -> AppResult<Vec<StorageEntry>> {
        let key = normalize(path)?;
        let prefix = if key.is_empty() {
            String::new()
        } else {
            format!("{key}/")
        };

        let tree = self.tree.read().await;
        let mut entries: BTreeMap<String, StorageEntry> = BTreeMap::new();

        for (file, data) in tree.files.range(prefix.clone()..) {
            let Some(rest) = file.strip_prefix(&prefix) else {
                break;
            };
            if !rest.contains('/') {
                entries.insert(
                    rest.to_string(),
                    StorageEntry {
                        name: rest.to_string(),
                        size_bytes: data.len() as u64,
                        is_directory: false,
                    },
                );
            }
        }

        for dir in tree.dirs.range(prefix.clone()..) {
            let Some(rest) = dir.strip_prefix(&prefix) else {
                break;
            };
            if !rest.is_empty() && !rest.contains('/') {
                entries.insert(
                    rest.to_string(),
                    StorageEntry {
                        name: rest.to_string(),
                        size_bytes: 0,
                        is_directory: true,
                    },
                );
            }
        }

        Ok(entries.into_values().collect())
    }

    async fn create_dir(&self, path: &str) -> AppResult<()> {
        let key = normalize(path)?;
        if !key.is_empty() {
            self.tree.write().await.add_dir_with_parents(&key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asgard_core::error::ErrorKind;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_write_read_delete() {
        let provider = MemoryStorageProvider::new();
        provider
            .write("alice/a.txt/v1", Bytes::from("hi"))
            .await
            .unwrap();

        assert!(provider.exists("alice").await.unwrap());
        assert!(provider.exists("alice/a.txt").await.unwrap());
        assert_eq!(
            provider.read_bytes("/alice//a.txt/v1").await.unwrap(),
            Bytes::from("hi")
        );

        provider.delete("alice/a.txt/v1").await.unwrap();
        provider.delete("alice/a.txt/v1").await.unwrap();
        let err = provider.read_bytes("alice/a.txt/v1").await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
        assert_eq!(provider.blob_count().await, 0);
    }

    #[tokio::test]
    async fn test_list_direct_children_only() {
        let provider = MemoryStorageProvider::new();
        provider.write("u/a.txt/1", Bytes::from("1")).await.unwrap();
        provider.write("u/a.txt/2", Bytes::from("22")).await.unwrap();
        provider.write("u/b.txt/1", Bytes::from("3")).await.unwrap();
        provider.write("uu/c.txt/1", Bytes::from("4")).await.unwrap();
        provider.create_dir("u/empty").await.unwrap();

        let names: Vec<_> = provider
            .list("u")
            .await
            .unwrap()
            .into_iter()
            .map(|e| (e.name, e.is_directory))
            .collect();
        assert_eq!(
            names,
            [
                ("a.txt".to_string(), true),
                ("b.txt".to_string(), true),
                ("empty".to_string(), true),
            ]
        );

        let versions = provider.list("u/a.txt").await.unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[1].size_bytes, 2);

        assert!(provider.list("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stream_read() {
        let provider = MemoryStorageProvider::new();
        provider.write("x/y", Bytes::from("abc")).await.unwrap();
        let mut stream = provider.read("x/y").await.unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap(), Bytes::from("abc"));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_rejects_dot_segments() {
        let provider = MemoryStorageProvider::new();
        let err = provider.write("a/../b", Bytes::new()).await.unwrap_err();
        assert!(err.is(ErrorKind::UnsafePath));
    }
}
