//! In-memory cache with per-entry time-to-live.
//!
//! Entries expire lazily: an entry whose deadline has passed is treated as
//! absent and removed on the next read, never swept proactively. There is
//! no size bound or eviction policy — keys are hostnames, a small and
//! slowly-changing set for any deployment.
//!
//! The cache itself is not synchronized. Callers that share an instance
//! across threads wrap it in a mutex; both `get` (read-then-delete) and
//! `set` (read-then-write) are two-step operations that would race under
//! unsynchronized parallel access.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A stored value paired with its absolute expiry deadline.
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Key→value store with per-entry expiry.
pub struct TtlCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Create an empty cache whose entries live for `default_ttl` unless a
    /// per-call override is given to [`TtlCache::set`].
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            default_ttl,
        }
    }

    /// Look up `key`, returning the value if present and not expired.
    ///
    /// An entry whose deadline is at or before the current instant counts
    /// as absent and is removed so dead entries do not accumulate.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => Instant::now() >= entry.expires_at,
        };

        if expired {
            self.entries.remove(key);
            return None;
        }

        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Store `value` under `key`, replacing any prior entry unconditionally.
    ///
    /// The entry expires `ttl_override` (or the cache default) from now.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl_override: Option<Duration>) {
        let ttl = ttl_override.unwrap_or(self.default_ttl);
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Number of entries currently stored, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
