//! In-memory cache backend.
//!
//! A single LRU map with per-entry expiry. Capacity eviction is handled by
//! the LRU policy; expired entries are dropped lazily on read.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;

use super::backend::{CacheBackend, CacheError};
use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

struct CacheEntry {
    value: Bytes,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

pub struct MemoryCache {
    entries: RwLock<LruCache<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.capacity_non_zero())),
        }
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        rw_write(&self.entries, "clear").clear();
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        // Write lock: an LRU get promotes the entry, and expired entries
        // are removed on the spot.
        let mut entries = rw_write(&self.entries, "get");
        let now = Instant::now();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.pop(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        rw_write(&self.entries, "set").put(key.to_string(), entry);
        Ok(())
    }

    async fn evict(&self, key: &str) -> Result<(), CacheError> {
        rw_write(&self.entries, "evict").pop(key);
        Ok(())
    }

    async fn evict_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        let mut entries = rw_write(&self.entries, "evict_prefix");
        let matching: Vec<String> = entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in matching {
            entries.pop(&key);
        }
        Ok(())
    }
}
