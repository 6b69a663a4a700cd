//! Short-TTL cache for suggestion lists.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use routeproxy_core::clock::{Clock, SystemClock};
use routeproxy_core::models::PlaceSuggestion;

/// Cache entry with an absolute expiry.
#[derive(Clone)]
struct CacheEntry {
    payload: Vec<PlaceSuggestion>,
    inserted_at: Instant,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub max_entries: usize,
    /// Time-to-live in seconds
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl_seconds: 60,
        }
    }
}

/// In-memory cache of reduced suggestion lists, keyed by
/// [`SuggestionQuery::cache_key`](routeproxy_core::models::SuggestionQuery::cache_key).
///
/// Expiry is enforced when an entry is read: an expired entry is deleted and
/// reported as a miss. Entries that are never read again are dropped by
/// [`purge_expired`](Self::purge_expired) or by capacity eviction on insert.
pub struct SuggestionCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl SuggestionCache {
    /// Creates a new cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache with custom configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.config.ttl_seconds)
    }

    /// Gets a cached suggestion list, deleting it if it has expired.
    pub fn get(&self, key: &str) -> Option<Vec<PlaceSuggestion>> {
        let now = self.clock.now();

        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.payload.clone()),
                Some(_) => {}
            }
        }

        // Expired: re-check under the write lock since a concurrent insert
        // may have refreshed the entry in between.
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                tracing::trace!(key = %key, "Evicted expired suggestion entry");
                None
            }
            Some(entry) => Some(entry.payload.clone()),
            None => None,
        }
    }

    /// Caches a suggestion list with the configured TTL.
    ///
    /// Nothing is stored when the TTL cannot be represented as a deadline.
    pub fn insert(&self, key: &str, payload: Vec<PlaceSuggestion>) {
        let now = self.clock.now();
        let Some(expires_at) = now.checked_add(self.ttl()) else {
            tracing::warn!(
                ttl_seconds = self.config.ttl_seconds,
                "Cache TTL out of range, not caching"
            );
            return;
        };
        let mut entries = self.entries.write();

        if self.config.max_entries > 0
            && entries.len() >= self.config.max_entries
            && !entries.contains_key(key)
        {
            entries.retain(|_, e| !e.is_expired(now));

            if entries.len() >= self.config.max_entries {
                if let Some(oldest_key) = entries
                    .iter()
                    .min_by_key(|(_, e)| e.inserted_at)
                    .map(|(k, _)| k.clone())
                {
                    entries.remove(&oldest_key);
                }
            }
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                payload,
                inserted_at: now,
                expires_at,
            },
        );
    }

    /// Removes all expired entries, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        before - entries.len()
    }

    /// Clears all cached entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Returns the number of resident entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let entries = self.entries.read();
        let expired = entries.values().filter(|e| e.is_expired(now)).count();
        CacheStats {
            total_entries: entries.len(),
            expired_entries: expired,
            valid_entries: entries.len().saturating_sub(expired),
            capacity: self.config.max_entries,
        }
    }
}

impl Default for SuggestionCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Clone, Debug, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub valid_entries: usize,
    pub capacity: usize,
}
