//! In-memory storage medium with LRU eviction.
//!
//! Used for tests and for sessions that do not need values to survive a
//! restart. Batches take the lock once.

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;

use glowbook_core::cache::{Result, StorageMedium};

/// Thread-safe in-memory medium bounded to `max_entries` keys.
///
/// When full, writing a new key evicts the least recently used one.
#[derive(Debug, Clone)]
pub struct MemoryMedium {
    store: Arc<RwLock<LruCache<String, String>>>,
}

impl MemoryMedium {
    /// Creates a medium holding at most `max_entries` keys (at least one).
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }

    /// Number of keys currently held.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

#[async_trait]
impl StorageMedium for MemoryMedium {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        // `LruCache::get` promotes the key, so it needs the write lock.
        let mut store = self.store.write().await;
        Ok(store.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.put(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.pop(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let store = self.store.read().await;
        Ok(store.iter().map(|(key, _)| key.clone()).collect())
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let mut store = self.store.write().await;
        Ok(keys.iter().map(|key| store.get(key).cloned()).collect())
    }

    async fn multi_set(&self, pairs: &[(String, String)]) -> Result<()> {
        let mut store = self.store.write().await;
        for (key, value) in pairs {
            store.put(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn multi_remove(&self, keys: &[String]) -> Result<()> {
        let mut store = self.store.write().await;
        for key in keys {
            store.pop(key);
        }
        Ok(())
    }
}
