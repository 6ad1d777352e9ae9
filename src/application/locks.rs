//! Per-product write serialization.
//!
//! The rating aggregate is recomputed with a read-then-write sequence;
//! without mutual exclusion two concurrent writes to the same product can
//! interleave and lose an update. Writers take the product's lock for the
//! whole recompute-and-persist span. The lock is an async mutex, so it may
//! be held across store calls without blocking the executor.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Default)]
pub struct ProductWriteLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl ProductWriteLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the write lock for one product. Writers for different
    /// products never contend.
    pub async fn acquire(&self, product_id: Uuid) -> OwnedMutexGuard<()> {
        let cell = self
            .locks
            .entry(product_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        cell.lock_owned().await
    }

    pub fn tracked_products(&self) -> usize {
        self.locks.len()
    }
}
