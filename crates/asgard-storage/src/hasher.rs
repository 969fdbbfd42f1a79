//! SHA-256 content hashing.
//!
//! Stored versions are hashed through their provider byte stream so a large
//! file is never loaded whole just to compare fingerprints.

use bytes::Bytes;
use futures::StreamExt;
use sha2::{Digest, Sha256};

use asgard_core::error::{AppError, ErrorKind};
use asgard_core::result::AppResult;
use asgard_core::traits::storage::ByteStream;
use asgard_core::types::ContentHash;

/// Block size used when re-chunking in-memory content.
pub const HASH_BLOCK_SIZE: usize = 64 * 1024;

/// Incremental SHA-256 hasher producing a [`ContentHash`].
#[derive(Debug, Clone, Default)]
pub struct ContentHasher {
    inner: Sha256,
}

impl ContentHasher {
    /// Start a new digest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk.
    pub fn update(&mut self, chunk: &[u8]) {
        self.inner.update(chunk);
    }

    /// Finish and return the digest.
    pub fn finalize(self) -> ContentHash {
        ContentHash::from_bytes(self.inner.finalize().into())
    }
}

/// Hash a complete buffer.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
    let mut hasher = ContentHasher::new();
    for block in data.chunks(HASH_BLOCK_SIZE) {
        hasher.update(block);
    }
    hasher.finalize()
}

/// Hash everything a byte stream yields.
pub async fn hash_stream(mut stream: ByteStream) -> AppResult<ContentHash> {
    let mut hasher = ContentHasher::new();
    while let Some(chunk) = stream.next().await {
        let chunk: Bytes = chunk
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Stream read error", e))?;
        hasher.update(&chunk);
    }
    Ok(hasher.finalize())
}
