use async_trait::async_trait;

use super::Result;

/// A raw string key-value medium underneath the keyed store.
///
/// Implementations know nothing about namespaces, envelopes or expiry. The
/// batch methods default to sequential single-key calls; mediums that can
/// batch natively should override them.
#[async_trait]
pub trait StorageMedium: Send + Sync {
    /// Gets a raw value by key.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores a raw value, replacing any existing one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a value. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Lists every key in the medium.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Gets several values, in key order.
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(self.get(key).await?);
        }
        Ok(values)
    }

    /// Stores several key-value pairs.
    async fn multi_set(&self, pairs: &[(String, String)]) -> Result<()> {
        for (key, value) in pairs {
            self.set(key, value).await?;
        }
        Ok(())
    }

    /// Removes several keys.
    async fn multi_remove(&self, keys: &[String]) -> Result<()> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}
