//! Typed envelope for persisted values.
//!
//! Every value written through the keyed store is wrapped in a
//! [`CacheEntry`] and stored as JSON:
//!
//! ```json
//! {"data": ..., "timestamp": 1717236000000, "expiresAt": 1717236300000}
//! ```

use std::time::Duration;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

use super::Result;

/// A persisted value with its write time and optional expiry, both in epoch
/// milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl<T> CacheEntry<T> {
    /// Wraps `data` written at `now`, expiring `ttl` later if given.
    pub fn new(data: T, now: i64, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|ttl| now.saturating_add(duration_millis(ttl)));
        Self {
            data,
            timestamp: now,
            expires_at,
        }
    }

    /// An entry is expired strictly after its expiry instant.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }
}

/// Serializes an entry to its JSON text form.
pub fn encode_entry<T: Serialize>(entry: &CacheEntry<T>) -> Result<String> {
    Ok(serde_json::to_string(entry)?)
}

/// Parses an entry from its JSON text form.
pub fn decode_entry<T: DeserializeOwned>(raw: &str) -> Result<CacheEntry<T>> {
    Ok(serde_json::from_str(raw)?)
}

/// Reads only the envelope metadata, skipping the payload.
///
/// Used where the payload type is unknown, e.g. expiry checks during
/// introspection.
pub fn decode_metadata(raw: &str) -> Result<CacheEntry<IgnoredAny>> {
    Ok(serde_json::from_str(raw)?)
}

fn duration_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}
