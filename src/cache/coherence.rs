//! Cache coherence manager.
//!
//! Owns the read-through path and the eviction trigger table. The invariants
//! it maintains:
//!
//! - a failed backend never fails the request: a broken get is a miss, a
//!   broken set or eviction is logged and counted;
//! - eviction runs only after the durable write succeeded, so a failed
//!   write never repopulates the cache with superseded data;
//! - single-entity writes evict their exact key, while listing/search
//!   domains are evicted wholesale (their results join many entities).

use std::sync::Arc;

use bytes::Bytes;
use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use super::backend::CacheBackend;
use super::config::CacheConfig;
use super::keys::{CacheDomain, CacheKey};

pub(crate) const METRIC_CACHE_HIT: &str = "recensio_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS: &str = "recensio_cache_miss_total";
pub(crate) const METRIC_CACHE_ERROR: &str = "recensio_cache_error_total";

pub struct CacheCoherenceManager {
    config: CacheConfig,
    backend: Arc<dyn CacheBackend>,
}

impl CacheCoherenceManager {
    pub fn new(config: CacheConfig, backend: Arc<dyn CacheBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // ========================================================================
    // Read-through path
    // ========================================================================

    /// Fetch and deserialize a cached value. Any failure is a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        if !self.config.enabled {
            return None;
        }

        let domain = key.domain().prefix();
        match self.backend.get(key.as_str()).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(value) => {
                    counter!(METRIC_CACHE_HIT, "domain" => domain).increment(1);
                    Some(value)
                }
                Err(err) => {
                    // A payload we can no longer decode is as good as gone.
                    warn!(key = key.as_str(), error = %err, "dropping undecodable cache entry");
                    let _ = self.backend.evict(key.as_str()).await;
                    counter!(METRIC_CACHE_MISS, "domain" => domain).increment(1);
                    None
                }
            },
            Ok(None) => {
                counter!(METRIC_CACHE_MISS, "domain" => domain).increment(1);
                None
            }
            Err(err) => {
                warn!(key = key.as_str(), error = %err, "cache get failed, treating as miss");
                counter!(METRIC_CACHE_ERROR, "domain" => domain, "op" => "get").increment(1);
                None
            }
        }
    }

    /// Serialize and store a value with its domain TTL. Failures are logged
    /// and ignored.
    pub async fn put_json<T: Serialize>(&self, key: &CacheKey, value: &T) {
        if !self.config.enabled {
            return;
        }

        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => Bytes::from(bytes),
            Err(err) => {
                warn!(key = key.as_str(), error = %err, "cache serialization failed");
                return;
            }
        };

        let ttl = self.config.ttl_for(key.domain());
        if let Err(err) = self.backend.set(key.as_str(), bytes, ttl).await {
            warn!(key = key.as_str(), error = %err, "cache set failed, skipping");
            counter!(METRIC_CACHE_ERROR, "domain" => key.domain().prefix(), "op" => "set")
                .increment(1);
        }
    }

    // ========================================================================
    // Eviction primitives
    // ========================================================================

    pub async fn evict_key(&self, key: &CacheKey) {
        if !self.config.enabled {
            return;
        }
        if let Err(err) = self.backend.evict(key.as_str()).await {
            warn!(key = key.as_str(), error = %err, "cache eviction failed, entry expires by TTL");
            counter!(METRIC_CACHE_ERROR, "domain" => key.domain().prefix(), "op" => "evict")
                .increment(1);
        }
    }

    pub async fn evict_domain(&self, domain: CacheDomain) {
        if !self.config.enabled {
            return;
        }
        // Trailing separator keeps `product` from matching `product-list`.
        let prefix = format!("{}:", domain.prefix());
        if let Err(err) = self.backend.evict_prefix(&prefix).await {
            warn!(domain = domain.prefix(), error = %err, "domain eviction failed, entries expire by TTL");
            counter!(METRIC_CACHE_ERROR, "domain" => domain.prefix(), "op" => "evict_prefix")
                .increment(1);
        }
    }

    // ========================================================================
    // Eviction trigger table
    //
    // One method per write event; every mutating operation calls exactly one
    // of these after its durable writes succeed.
    // ========================================================================

    /// A review was created, updated, deleted, or moderated.
    pub async fn review_written(&self, review_id: Uuid) {
        debug!(review_id = %review_id, "evicting review caches");
        self.evict_key(&CacheKey::review(review_id)).await;
        self.evict_domain(CacheDomain::ReviewsByProduct).await;
        self.evict_domain(CacheDomain::ReviewsByUser).await;
    }

    /// A product row changed: catalog fields or the rating aggregate.
    pub async fn product_written(&self, product_id: Uuid) {
        debug!(product_id = %product_id, "evicting product caches");
        self.evict_key(&CacheKey::product(product_id)).await;
        self.evict_domain(CacheDomain::ProductList).await;
        self.evict_domain(CacheDomain::ProductSearch).await;
    }

    /// A product was created; no single-entity key can be stale yet, but
    /// every listing and search page is.
    pub async fn product_created(&self) {
        debug!("evicting product listing caches");
        self.evict_domain(CacheDomain::ProductList).await;
        self.evict_domain(CacheDomain::ProductSearch).await;
    }
}
