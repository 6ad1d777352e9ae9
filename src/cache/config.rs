//! Cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

use super::keys::CacheDomain;

const DEFAULT_CAPACITY: usize = 4096;
const DEFAULT_PRODUCT_TTL_SECS: u64 = 60 * 60;
const DEFAULT_PRODUCT_LIST_TTL_SECS: u64 = 10 * 60;
const DEFAULT_PRODUCT_SEARCH_TTL_SECS: u64 = 15 * 60;
const DEFAULT_REVIEW_TTL_SECS: u64 = 30 * 60;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Disabling the cache turns every read into a store query and every
    /// eviction into a no-op.
    pub enabled: bool,
    /// Maximum number of entries held by the in-memory backend.
    pub capacity: usize,
    /// TTL for single-product entries.
    pub product_ttl_secs: u64,
    /// TTL for product listing pages.
    pub product_list_ttl_secs: u64,
    /// TTL for product search pages.
    pub product_search_ttl_secs: u64,
    /// Default TTL for review entries; these are evicted explicitly on
    /// every write, the TTL is only a backstop.
    pub review_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_CAPACITY,
            product_ttl_secs: DEFAULT_PRODUCT_TTL_SECS,
            product_list_ttl_secs: DEFAULT_PRODUCT_LIST_TTL_SECS,
            product_search_ttl_secs: DEFAULT_PRODUCT_SEARCH_TTL_SECS,
            review_ttl_secs: DEFAULT_REVIEW_TTL_SECS,
        }
    }
}

impl CacheConfig {
    pub fn capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn ttl_for(&self, domain: CacheDomain) -> Duration {
        let secs = match domain {
            CacheDomain::ProductById => self.product_ttl_secs,
            CacheDomain::ProductList => self.product_list_ttl_secs,
            CacheDomain::ProductSearch => self.product_search_ttl_secs,
            CacheDomain::ReviewById
            | CacheDomain::ReviewsByProduct
            | CacheDomain::ReviewsByUser => self.review_ttl_secs,
        };
        Duration::from_secs(secs)
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            capacity: settings.capacity,
            product_ttl_secs: settings.product_ttl_secs,
            product_list_ttl_secs: settings.product_list_ttl_secs,
            product_search_ttl_secs: settings.product_search_ttl_secs,
            review_ttl_secs: settings.review_ttl_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttls_per_domain() {
        let config = CacheConfig::default();
        assert_eq!(
            config.ttl_for(CacheDomain::ProductById),
            Duration::from_secs(3600)
        );
        assert_eq!(
            config.ttl_for(CacheDomain::ProductList),
            Duration::from_secs(600)
        );
        assert_eq!(
            config.ttl_for(CacheDomain::ProductSearch),
            Duration::from_secs(900)
        );
        assert_eq!(
            config.ttl_for(CacheDomain::ReviewsByUser),
            Duration::from_secs(1800)
        );
    }

    #[test]
    fn zero_capacity_clamps_to_one() {
        let config = CacheConfig {
            capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.capacity_non_zero().get(), 1);
    }
}
