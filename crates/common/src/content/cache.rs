//! Read-through cache for file content
//!
//! Uses moka for bounded concurrent storage. Expiry is checked lazily on
//! read against the injected clock rather than by moka's own timer, so an
//! entry is valid exactly while `now - cached_at < ttl`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::sync::Cache;

use crate::clock::SharedClock;

/// Configuration for the content cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long an entry stays valid after it was written (default: 5 minutes)
    pub ttl: Duration,
    /// Upper bound on cached paths (default: 10,000)
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            max_entries: 10_000,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    content: String,
    cached_at: DateTime<Utc>,
}

/// Path-keyed cache of file content with a fixed time-to-live
pub struct ContentCache {
    entries: Cache<String, CacheEntry>,
    ttl: chrono::Duration,
    clock: SharedClock,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for ContentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentCache")
            .field("entries", &self.len())
            .field("ttl", &self.ttl)
            .field("hits", &self.hits())
            .field("misses", &self.misses())
            .finish()
    }
}

impl ContentCache {
    pub fn new(config: CacheConfig, clock: SharedClock) -> Self {
        Self {
            entries: Cache::builder().max_capacity(config.max_entries).build(),
            ttl: chrono::Duration::from_std(config.ttl).unwrap_or(chrono::Duration::MAX),
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cached content for a path, if still fresh.
    ///
    /// A stale entry is evicted on the way out.
    pub fn get(&self, path: &str) -> Option<String> {
        let fresh = self.entries.get(path).and_then(|entry| {
            if self.clock.now() - entry.cached_at < self.ttl {
                Some(entry.content)
            } else {
                self.entries.invalidate(path);
                None
            }
        });

        let counter = if fresh.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        fresh
    }

    /// Cache content for a path, stamped with the current time.
    pub fn put(&self, path: &str, content: String) {
        let entry = CacheEntry {
            content,
            cached_at: self.clock.now(),
        };
        self.entries.insert(path.to_string(), entry);
    }

    /// Drop the entry for a single path.
    pub fn invalidate(&self, path: &str) {
        self.entries.invalidate(path);
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
    }

    /// Number of cached paths, fresh or not yet lazily evicted.
    pub fn len(&self) -> u64 {
        // entry_count() lags until maintenance runs; walking is exact
        self.entries.iter().count() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lookups answered from a fresh entry.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that found nothing, or only a stale entry.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
