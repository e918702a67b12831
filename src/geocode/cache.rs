//! TTL-keyed response cache for resolved addresses.
//!
//! Sits in front of the provider chain so a batch that repeats an address
//! (common for property transactions at the same building) costs one
//! network call. Safe for concurrent read/write from the worker pool.
//!
//! Eviction is lazy: an entry past its TTL is removed when a reader finds
//! it, and callers can run an explicit [`ResponseCache::purge_expired`]
//! sweep between batches. An expired entry is indistinguishable from a miss.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::domain::ResolvedLocation;

struct CacheEntry {
    value: ResolvedLocation,
    inserted_at: Instant,
}

/// Thread-safe TTL cache keyed by normalized address.
pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Normalize an address into a cache key: trim and collapse runs of
    /// whitespace so trivially different spellings share an entry.
    pub fn cache_key(address: &str) -> String {
        address.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Look up an address. Expired entries are removed and reported as a miss.
    pub fn get(&self, address: &str) -> Option<ResolvedLocation> {
        let key = Self::cache_key(address);
        {
            let entries = self.entries.read();
            match entries.get(&key) {
                Some(entry) if entry.inserted_at.elapsed() <= self.ttl => {
                    return Some(entry.value.clone());
                }
                Some(_) => {} // expired, fall through to remove
                None => return None,
            }
        }
        self.entries.write().remove(&key);
        None
    }

    /// Store a resolution under its normalized address.
    pub fn insert(&self, address: &str, value: ResolvedLocation) {
        let key = Self::cache_key(address);
        self.entries.write().insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.inserted_at.elapsed() <= self.ttl);
        before - entries.len()
    }

    /// Number of live plus not-yet-purged entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
