//! Keyed async mutexes.
//!
//! Writers of the same `(user, filename)` are serialized; writers of
//! different files proceed in parallel. Entries are dropped from the table
//! once the last holder or waiter lets go, so the table stays proportional
//! to in-flight writes.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable<K> = DashMap<K, Arc<Mutex<()>>>;

/// A table of async mutexes created on demand per key.
pub struct KeyedLocks<K: Eq + Hash + Clone> {
    table: Arc<LockTable<K>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self {
            table: Arc::new(DashMap::new()),
        }
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: K) -> KeyedLockGuard<K> {
        let mutex = self
            .table
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        KeyedLockGuard {
            key,
            table: Arc::clone(&self.table),
            guard: Some(guard),
        }
    }

    /// Number of keys currently held or waited on.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no key is held.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> fmt::Debug for KeyedLocks<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedLocks")
            .field("held", &self.table.len())
            .finish()
    }
}

/// Exclusive access to one key. Released on drop.
pub struct KeyedLockGuard<K: Eq + Hash + Clone> {
    key: K,
    table: Arc<LockTable<K>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K: Eq + Hash + Clone> Drop for KeyedLockGuard<K> {
    fn drop(&mut self) {
        // Release the mutex first so its Arc count reflects only the table
        // and any waiters.
        drop(self.guard.take());
        self.table
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
