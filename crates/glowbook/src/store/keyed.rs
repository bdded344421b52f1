//! Namespaced, optionally-expiring typed storage over a [`StorageMedium`].
//!
//! Every operation is best-effort: medium and serialization errors are
//! logged, forwarded to diagnostics and degrade to a miss or a dropped write.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use glowbook_core::cache::{
    decode_entry, decode_metadata, encode_entry, namespace_prefix, namespaced_key,
    strip_namespace, CacheEntry, CacheError, Clock, StorageMedium, SystemClock,
};
use glowbook_core::notify::Diagnostics;

/// Options for a write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Time-to-live. `None` never expires.
    pub ttl: Option<Duration>,
}

impl SetOptions {
    pub fn ttl(ttl: Duration) -> Self {
        Self { ttl: Some(ttl) }
    }
}

/// Typed key-value store scoped to one namespace.
///
/// Cloning is cheap and shares the medium. Use [`KeyedStore::with_namespace`]
/// to give each feature its own key space on the same medium.
#[derive(Clone)]
pub struct KeyedStore {
    medium: Arc<dyn StorageMedium>,
    namespace: String,
    clock: Arc<dyn Clock>,
    diagnostics: Option<Arc<dyn Diagnostics>>,
}

impl KeyedStore {
    /// Creates a store over `medium` using the wall clock.
    pub fn new(medium: Arc<dyn StorageMedium>, namespace: impl Into<String>) -> Self {
        Self {
            medium,
            namespace: namespace.into(),
            clock: Arc::new(SystemClock),
            diagnostics: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Returns a store sharing this one's medium, clock and diagnostics under
    /// another namespace.
    pub fn with_namespace(&self, namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..self.clone()
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Reads a value. Absent, expired and undecodable entries all read as
    /// `None`; expired entries are removed.
    pub async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        let full_key = namespaced_key(&self.namespace, key);

        let raw = match self.medium.get(&full_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::trace!(namespace = %self.namespace, key, "Cache miss");
                return None;
            }
            Err(err) => {
                self.absorb("get", key, &err);
                return None;
            }
        };

        let entry = match decode_entry::<T>(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                self.absorb("decode", key, &err);
                return None;
            }
        };

        if entry.is_expired_at(self.clock.now_millis()) {
            tracing::debug!(namespace = %self.namespace, key, "Evicting expired entry");
            self.evict(&full_key, key).await;
            return None;
        }

        tracing::trace!(namespace = %self.namespace, key, "Cache hit");
        Some(entry.data)
    }

    /// Writes a value, replacing any existing entry.
    pub async fn set<T>(&self, key: &str, value: &T, options: SetOptions)
    where
        T: Serialize + Sync + ?Sized,
    {
        let raw = match self.encode(value, options) {
            Ok(raw) => raw,
            Err(err) => {
                self.absorb("encode", key, &err);
                return;
            }
        };

        let full_key = namespaced_key(&self.namespace, key);
        if let Err(err) = self.medium.set(&full_key, &raw).await {
            self.absorb("set", key, &err);
        }
    }

    /// Removes a value. Removing a missing key is a no-op.
    pub async fn remove(&self, key: &str) {
        let full_key = namespaced_key(&self.namespace, key);
        if let Err(err) = self.medium.remove(&full_key).await {
            self.absorb("remove", key, &err);
        }
    }

    /// Removes every entry in this namespace. Other namespaces are untouched.
    pub async fn clear(&self) {
        let keys = self.namespaced_medium_keys().await;
        if keys.is_empty() {
            return;
        }
        if let Err(err) = self.medium.multi_remove(&keys).await {
            self.absorb("clear", "*", &err);
        }
    }

    /// Reads several values in one medium batch. Results are in key order.
    pub async fn multi_get<T: DeserializeOwned + Send>(&self, keys: &[&str]) -> Vec<Option<T>> {
        let full_keys: Vec<String> = keys
            .iter()
            .map(|key| namespaced_key(&self.namespace, key))
            .collect();

        let raws = match self.medium.multi_get(&full_keys).await {
            Ok(raws) => raws,
            Err(err) => {
                self.absorb("multi_get", "*", &err);
                return keys.iter().map(|_| None).collect();
            }
        };

        let now = self.clock.now_millis();
        let mut expired = Vec::new();
        let mut values = Vec::with_capacity(keys.len());

        for ((key, full_key), raw) in keys.iter().zip(full_keys).zip(raws) {
            let value = match raw.map(|raw| decode_entry::<T>(&raw)) {
                None => None,
                Some(Err(err)) => {
                    self.absorb("decode", key, &err);
                    None
                }
                Some(Ok(entry)) if entry.is_expired_at(now) => {
                    expired.push(full_key);
                    None
                }
                Some(Ok(entry)) => Some(entry.data),
            };
            values.push(value);
        }

        if !expired.is_empty() {
            tracing::debug!(namespace = %self.namespace, count = expired.len(), "Evicting expired entries");
            if let Err(err) = self.medium.multi_remove(&expired).await {
                self.absorb("evict", "*", &err);
            }
        }

        values
    }

    /// Writes several values in one medium batch, all with the same options.
    pub async fn multi_set<T>(&self, pairs: &[(&str, T)], options: SetOptions)
    where
        T: Serialize + Sync,
    {
        let mut encoded = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            match self.encode(value, options) {
                Ok(raw) => encoded.push((namespaced_key(&self.namespace, key), raw)),
                Err(err) => self.absorb("encode", key, &err),
            }
        }

        if let Err(err) = self.medium.multi_set(&encoded).await {
            self.absorb("multi_set", "*", &err);
        }
    }

    /// Removes several keys in one medium batch.
    pub async fn multi_remove(&self, keys: &[&str]) {
        let full_keys: Vec<String> = keys
            .iter()
            .map(|key| namespaced_key(&self.namespace, key))
            .collect();

        if let Err(err) = self.medium.multi_remove(&full_keys).await {
            self.absorb("multi_remove", "*", &err);
        }
    }

    /// Keys stored in this namespace, with the namespace stripped.
    ///
    /// Expired entries that have not been read yet are still listed.
    pub async fn get_all_keys(&self) -> Vec<String> {
        self.namespaced_medium_keys()
            .await
            .iter()
            .filter_map(|full_key| strip_namespace(&self.namespace, full_key))
            .map(str::to_string)
            .collect()
    }

    /// Returns true if `key` holds an unexpired entry.
    pub async fn has_item(&self, key: &str) -> bool {
        let full_key = namespaced_key(&self.namespace, key);

        let raw = match self.medium.get(&full_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(err) => {
                self.absorb("has_item", key, &err);
                return false;
            }
        };

        match decode_metadata(&raw) {
            Ok(entry) if entry.is_expired_at(self.clock.now_millis()) => {
                self.evict(&full_key, key).await;
                false
            }
            Ok(_) => true,
            Err(err) => {
                self.absorb("decode", key, &err);
                false
            }
        }
    }

    /// Bytes used by this namespace, counting keys and raw values.
    pub async fn get_size(&self) -> usize {
        let keys = self.namespaced_medium_keys().await;
        if keys.is_empty() {
            return 0;
        }

        match self.medium.multi_get(&keys).await {
            Ok(values) => keys
                .iter()
                .zip(values)
                .map(|(key, value)| key.len() + value.map_or(0, |v| v.len()))
                .sum(),
            Err(err) => {
                self.absorb("get_size", "*", &err);
                0
            }
        }
    }

    fn encode<T>(&self, value: &T, options: SetOptions) -> Result<String, CacheError>
    where
        T: Serialize + ?Sized,
    {
        let entry = CacheEntry::new(value, self.clock.now_millis(), options.ttl);
        encode_entry(&entry)
    }

    async fn namespaced_medium_keys(&self) -> Vec<String> {
        let prefix = namespace_prefix(&self.namespace);
        match self.medium.keys().await {
            Ok(keys) => keys
                .into_iter()
                .filter(|key| key.starts_with(&prefix))
                .collect(),
            Err(err) => {
                self.absorb("keys", "*", &err);
                Vec::new()
            }
        }
    }

    async fn evict(&self, full_key: &str, key: &str) {
        if let Err(err) = self.medium.remove(full_key).await {
            self.absorb("evict", key, &err);
        }
    }

    fn absorb(&self, operation: &'static str, key: &str, err: &CacheError) {
        tracing::warn!(
            namespace = %self.namespace,
            key,
            operation,
            error = %err,
            "Keyed store operation failed"
        );
        if let Some(diagnostics) = &self.diagnostics {
            diagnostics.record_error(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryMedium;
    use crate::test_support::{FailingMedium, RecordingDiagnostics};
    use glowbook_core::cache::ManualClock;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        visits: u32,
    }

    fn profile() -> Profile {
        Profile {
            name: "Ana".to_string(),
            visits: 3,
        }
    }

    fn store_with_clock(start: i64) -> (KeyedStore, Arc<ManualClock>, Arc<MemoryMedium>) {
        let medium = Arc::new(MemoryMedium::new(100));
        let clock = Arc::new(ManualClock::new(start));
        let store = KeyedStore::new(medium.clone(), "app").with_clock(clock.clone());
        (store, clock, medium)
    }

    #[tokio::test]
    async fn test_set_then_get_returns_equal_value() {
        let (store, _, _) = store_with_clock(0);

        store.set("profile", &profile(), SetOptions::default()).await;

        assert_eq!(store.get::<Profile>("profile").await, Some(profile()));
        assert_eq!(store.get::<Profile>("missing").await, None);
    }

    #[tokio::test]
    async fn test_persisted_layout() {
        let (store, _, medium) = store_with_clock(1_000);

        store
            .set("profile", &profile(), SetOptions::ttl(Duration::from_millis(500)))
            .await;

        let raw = medium.get("app:profile").await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "data": {"name": "Ana", "visits": 3},
                "timestamp": 1000,
                "expiresAt": 1500
            })
        );
    }

    #[tokio::test]
    async fn test_remove_twice_leaves_key_absent() {
        let (store, _, _) = store_with_clock(0);
        store.set("k", &1u32, SetOptions::default()).await;

        store.remove("k").await;
        store.remove("k").await;

        assert_eq!(store.get::<u32>("k").await, None);
        assert!(!store.has_item("k").await);
    }

    #[tokio::test]
    async fn test_ttl_boundary() {
        let (store, clock, medium) = store_with_clock(10_000);
        store
            .set("k", &"v", SetOptions::ttl(Duration::from_millis(1_000)))
            .await;

        clock.set(10_999);
        assert_eq!(store.get::<String>("k").await, Some("v".to_string()));

        clock.set(11_000);
        assert!(store.has_item("k").await);

        clock.set(11_001);
        assert_eq!(store.get::<String>("k").await, None);
        assert_eq!(medium.get("app:k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_has_item_evicts_expired() {
        let (store, clock, medium) = store_with_clock(0);
        store
            .set("k", &1u32, SetOptions::ttl(Duration::from_millis(10)))
            .await;

        clock.advance(11);

        assert!(!store.has_item("k").await);
        assert!(medium.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear_only_touches_own_namespace() {
        let (store, _, medium) = store_with_clock(0);
        let other = store.with_namespace("other");
        store.set("a", &1u32, SetOptions::default()).await;
        store.set("b", &2u32, SetOptions::default()).await;
        other.set("a", &3u32, SetOptions::default()).await;

        store.clear().await;

        assert!(store.get_all_keys().await.is_empty());
        assert_eq!(other.get::<u32>("a").await, Some(3));
        assert_eq!(medium.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_all_keys_strips_namespace() {
        let (store, _, medium) = store_with_clock(0);
        store.set("b", &1u32, SetOptions::default()).await;
        store.set("a", &1u32, SetOptions::default()).await;
        medium.set("apple:x", "{}").await.unwrap();

        let mut keys = store.get_all_keys().await;
        keys.sort();

        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_batches() {
        let (store, clock, _) = store_with_clock(0);
        store
            .multi_set(&[("a", 1u32), ("b", 2u32)], SetOptions::default())
            .await;
        store
            .set("short", &3u32, SetOptions::ttl(Duration::from_millis(5)))
            .await;
        clock.advance(6);

        let values = store.multi_get::<u32>(&["b", "missing", "short", "a"]).await;
        assert_eq!(values, vec![Some(2), None, None, Some(1)]);
        assert!(!store.get_all_keys().await.contains(&"short".to_string()));

        store.multi_remove(&["a", "b"]).await;
        assert!(store.get_all_keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_get_size_counts_namespace_bytes() {
        let (store, _, medium) = store_with_clock(0);
        assert_eq!(store.get_size().await, 0);

        store.set("k", &1u32, SetOptions::default()).await;
        medium.set("other:k", "ignored").await.unwrap();

        let raw = medium.get("app:k").await.unwrap().unwrap();
        assert_eq!(store.get_size().await, "app:k".len() + raw.len());
    }

    #[tokio::test]
    async fn test_undecodable_entry_reads_as_none() {
        let (store, _, medium) = store_with_clock(0);
        medium.set("app:k", "not json").await.unwrap();
        store.set("n", &"text", SetOptions::default()).await;

        assert_eq!(store.get::<u32>("k").await, None);
        assert_eq!(store.get::<u32>("n").await, None);
    }

    #[tokio::test]
    async fn test_failing_medium_degrades_silently() {
        let diagnostics = Arc::new(RecordingDiagnostics::default());
        let store = KeyedStore::new(Arc::new(FailingMedium), "app")
            .with_diagnostics(diagnostics.clone());

        store.set("k", &1u32, SetOptions::default()).await;
        assert_eq!(store.get::<u32>("k").await, None);
        assert!(!store.has_item("k").await);
        store.remove("k").await;
        store.clear().await;
        assert_eq!(store.get_size().await, 0);
        assert_eq!(store.multi_get::<u32>(&["a", "b"]).await, vec![None, None]);

        assert_eq!(diagnostics.errors().len(), 7);
    }
}
