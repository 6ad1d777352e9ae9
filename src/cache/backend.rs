//! Cache backend interface.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// A cache backend failure. Never fatal: a failed read is a miss, a failed
/// write or eviction is logged and ignored by the coherence layer.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation timed out")]
    Timeout,
}

/// Key/value store with per-entry TTL and prefix eviction.
///
/// Implementations may be transiently unavailable; callers must treat every
/// error as a degraded cache, not a failed operation.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError>;

    async fn evict(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every entry whose key starts with `prefix`. Listing and
    /// search results are joins over many entities, so their domains are
    /// evicted wholesale rather than per key.
    async fn evict_prefix(&self, prefix: &str) -> Result<(), CacheError>;
}
