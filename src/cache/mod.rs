//! Read-through cache with explicit coherence.
//!
//! Caching is not sprinkled over individual operations; it is one component
//! with an auditable contract:
//!
//! - [`keys`] derives a canonical key from an operation and its full
//!   parameter set, so identical queries always hit the same entry.
//! - [`backend`] is the key/value store interface. It may fail at any time;
//!   the durable stores remain the source of truth.
//! - [`coherence`] owns the read-through path and the eviction trigger
//!   table executed after every successful durable write.

mod backend;
mod config;
mod coherence;
mod keys;
mod lock;
mod store;

pub use backend::{CacheBackend, CacheError};
pub use config::CacheConfig;
pub use coherence::CacheCoherenceManager;
pub use keys::{CacheDomain, CacheKey};
pub use store::MemoryCache;
