//! Service catalog with cache-aside reads over the keyed store.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use glowbook_core::cache::{PROFESSIONALS_KEY, SERVICES_KEY};
use glowbook_core::catalog::{self, Professional, Service};
use glowbook_core::storage::{CatalogBackend, Result};

use crate::store::{KeyedStore, SetOptions};

/// Catalog reads that check the keyed store first and populate it on a miss.
pub struct CachedCatalog {
    backend: Arc<dyn CatalogBackend>,
    cache: KeyedStore,
    ttl: Duration,
}

impl CachedCatalog {
    /// Creates a catalog caching into `cache`, which should use a namespace
    /// of its own.
    pub fn new(backend: Arc<dyn CatalogBackend>, cache: KeyedStore, ttl: Duration) -> Self {
        Self {
            backend,
            cache,
            ttl,
        }
    }

    /// All bookable services.
    pub async fn services(&self) -> Result<Vec<Service>> {
        self.cached(SERVICES_KEY, || self.backend.list_services())
            .await
    }

    /// All professionals.
    pub async fn professionals(&self) -> Result<Vec<Professional>> {
        self.cached(PROFESSIONALS_KEY, || self.backend.list_professionals())
            .await
    }

    /// Services offered by one provider, in catalog order.
    pub async fn services_by_provider(&self, provider_id: &str) -> Result<Vec<Service>> {
        let services = self.services().await?;
        Ok(catalog::services_by_provider(&services, provider_id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Drops every cached catalog entry so the next read goes to the backend.
    pub async fn invalidate(&self) {
        self.cache.clear().await;
        tracing::debug!(namespace = self.cache.namespace(), "Catalog cache invalidated");
    }

    async fn cached<T, F, Fut>(&self, key: &str, fetch: F) -> Result<Vec<T>>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<T>>>,
    {
        if let Some(items) = self.cache.get::<Vec<T>>(key).await {
            tracing::trace!(key, count = items.len(), "Cache hit for catalog");
            return Ok(items);
        }

        tracing::trace!(key, "Cache miss for catalog");
        let items = fetch().await?;
        self.cache
            .set(key, &items, SetOptions::ttl(self.ttl))
            .await;

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryMedium;
    use crate::test_support::FlakyBackend;

    fn service(id: &str, provider_id: &str) -> Service {
        Service {
            id: id.to_string(),
            provider_id: provider_id.to_string(),
            name: format!("Service {id}"),
            description: None,
            category: Some("hair".to_string()),
            price_cents: 4_500,
            duration_minutes: 60,
        }
    }

    async fn catalog() -> (CachedCatalog, Arc<FlakyBackend>) {
        let backend = Arc::new(FlakyBackend::new());
        backend
            .inner
            .seed_services(vec![service("s1", "p1"), service("s2", "p2"), service("s3", "p1")])
            .await;
        let cache = KeyedStore::new(Arc::new(MemoryMedium::new(100)), "glowbook.catalog");
        let catalog = CachedCatalog::new(backend.clone(), cache, Duration::from_secs(60));
        (catalog, backend)
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let (catalog, backend) = catalog().await;

        let first = catalog.services().await.unwrap();
        let second = catalog.services().await.unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_survives_backend_outage() {
        let (catalog, backend) = catalog().await;
        catalog.services().await.unwrap();

        backend.set_failing(true);

        assert_eq!(catalog.services().await.unwrap().len(), 3);
        assert!(catalog.professionals().await.is_err());
    }

    #[tokio::test]
    async fn test_services_by_provider() {
        let (catalog, _) = catalog().await;

        let ids: Vec<_> = catalog
            .services_by_provider("p1")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();

        assert_eq!(ids, vec!["s1".to_string(), "s3".to_string()]);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let (catalog, backend) = catalog().await;
        catalog.services().await.unwrap();

        catalog.invalidate().await;
        catalog.services().await.unwrap();

        assert_eq!(backend.calls(), 2);
    }
}
