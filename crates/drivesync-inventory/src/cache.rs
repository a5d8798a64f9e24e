//! Time- and size-bounded cache in front of the inventory read endpoints.
//!
//! General contract: `get` returns a hit only while the entry is inside its
//! TTL; expired entries read as misses even if still held. Capacity is
//! bounded per cache instance, with least-recently-used entries evicted
//! first when full (eviction is delegated to moka, which approximates LRU).
//! On a miss the caller fetches live and populates via `insert`; fetch
//! failures must NOT populate the cache, so the next call retries the live
//! fetch.
//!
//! In this system each instance holds exactly one key ([`CATALOG_KEY`] or
//! [`LOCATIONS_KEY`]), making it a memoized-with-expiry snapshot rather
//! than a general per-key cache. The general contract is kept anyway so the
//! two caches can carry independent capacities and TTLs from config.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

/// The single key used by the catalog cache.
pub const CATALOG_KEY: &str = "catalog";

/// The single key used by the locations cache.
pub const LOCATIONS_KEY: &str = "locations";

pub struct LookupCache<T> {
    inner: Cache<&'static str, Arc<Vec<T>>>,
}

impl<T: Send + Sync + 'static> LookupCache<T> {
    #[must_use]
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Returns the cached snapshot, or `None` on miss or TTL expiry.
    #[must_use]
    pub fn get(&self, key: &'static str) -> Option<Arc<Vec<T>>> {
        self.inner.get(key)
    }

    /// Stores a fresh snapshot and returns the shared handle to it.
    pub fn insert(&self, key: &'static str, value: Vec<T>) -> Arc<Vec<T>> {
        let value = Arc::new(value);
        self.inner.insert(key, Arc::clone(&value));
        value
    }
}
