//! Storage provider selection.

use std::sync::Arc;

use tracing::info;

use asgard_core::config::{StorageConfig, StorageProviderKind};
use asgard_core::result::AppResult;
use asgard_core::traits::storage::StorageProvider;

use crate::providers::{LocalStorageProvider, MemoryStorageProvider};

/// Open the provider named by the storage configuration.
pub async fn open_provider(config: &StorageConfig) -> AppResult<Arc<dyn StorageProvider>> {
    let provider: Arc<dyn StorageProvider> = match config.provider {
        StorageProviderKind::Local => {
            Arc::new(LocalStorageProvider::new(&config.local.root_path).await?)
        }
        StorageProviderKind::Memory => Arc::new(MemoryStorageProvider::new()),
    };

    info!(
        provider = provider.provider_type(),
        root = %config.local.root_path,
        "Storage provider initialized"
    );
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_opens_memory_provider() {
        let config = StorageConfig {
            provider: StorageProviderKind::Memory,
            ..StorageConfig::default()
        };
        let provider = open_provider(&config).await.unwrap();
        assert_eq!(provider.provider_type(), "memory");
        assert!(provider.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_opens_local_provider_and_creates_root() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("blobs");
        let mut config = StorageConfig::default();
        config.local.root_path = root.to_string_lossy().into_owned();

        let provider = open_provider(&config).await.unwrap();
        assert_eq!(provider.provider_type(), "local");
        assert!(root.is_dir());
    }
}
