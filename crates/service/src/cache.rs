// ABOUTME: In-process result cache keyed by (site, query) with a fixed 10 second freshness window.
// ABOUTME: The lock guards only map access; no I/O ever happens while it is held.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, Utc};
use smartyshop_scrapers::Product;
use tracing::info;

use crate::clock::{Clock, SystemClock};

/// How long a stored result stays fresh, in seconds.
pub const CACHE_TTL_SECS: i64 = 10;

/// Exact, case-sensitive cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub site: String,
    pub query: String,
}

impl CacheKey {
    pub fn new(site: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            query: query.into(),
        }
    }
}

/// One stored scrape result.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub products: Arc<[Product]>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Shared result cache. Entries are replaced on write and never evicted.
pub struct ResultCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Raw lookup without any freshness judgment.
    pub fn get(&self, site: &str, query: &str) -> Option<CacheEntry> {
        let key = CacheKey::new(site, query);
        self.lock().get(&key).cloned()
    }

    /// Stores `products`, fresh for [`CACHE_TTL_SECS`] from now. Replaces any prior entry.
    pub fn put(&self, site: &str, query: &str, products: Vec<Product>) -> CacheEntry {
        let entry = CacheEntry {
            products: products.into(),
            expires_at: self.clock.now() + TimeDelta::seconds(CACHE_TTL_SECS),
        };
        let count = entry.products.len();
        self.lock()
            .insert(CacheKey::new(site, query), entry.clone());
        info!(site, query, count, "results cached");
        entry
    }

    /// The entry for a key if present and still fresh.
    pub fn get_fresh(&self, site: &str, query: &str) -> Option<CacheEntry> {
        let now = self.clock.now();
        self.get(site, query).filter(|e| e.is_fresh(now))
    }

    /// Up to `n` products of a fresh entry, best rated first. Ties keep scrape order.
    pub fn fresh_top(&self, site: &str, query: &str, n: usize) -> Option<Vec<Product>> {
        let entry = self.get_fresh(site, query)?;
        let mut products = entry.products.to_vec();
        products.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        products.truncate(n);
        Some(products)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("entries", &self.len())
            .finish()
    }
}
