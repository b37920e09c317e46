//! In-memory TTL store for resolved configurations, one instance per kind.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::types::Locale;

use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// A resolved value and the instant it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub stored_at: Instant,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) > ttl
    }
}

/// Locale-keyed store with lazy TTL expiry.
///
/// Expired entries are removed when they are read; nothing sweeps in the
/// background. Time comes from the tokio clock, so tests can pause and
/// advance it.
pub struct CacheStore<T> {
    ttl: Duration,
    entries: RwLock<HashMap<Locale, CacheEntry<T>>>,
}

impl<T: Clone> CacheStore<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key` unless it is absent or older than
    /// the TTL. An expired entry is evicted as part of the read.
    pub fn get(&self, key: &Locale) -> Option<T> {
        let now = Instant::now();
        let mut entries = rw_write(&self.entries, SOURCE, "get");

        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired(now, self.ttl) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(key);
        }
        None
    }

    /// Store `value`, replacing any previous entry and restarting its TTL.
    pub fn set(&self, key: Locale, value: T) {
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
        };
        rw_write(&self.entries, SOURCE, "set").insert(key, entry);
    }

    /// Drop one locale, or every locale when `key` is `None`.
    pub fn clear(&self, key: Option<&Locale>) {
        let mut entries = rw_write(&self.entries, SOURCE, "clear");
        match key {
            Some(key) => {
                entries.remove(key);
            }
            None => entries.clear(),
        }
    }

    /// Number of stored entries, expired ones included until they are read.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
