//! Query result cache.
//!
//! Memoizes interpreter output by a hash of the query text and its
//! context (e.g. the session the dataset belongs to). Entries expire
//! lazily once older than the TTL; when the cache is full, the globally
//! oldest entry by insertion time is evicted first. Eviction is
//! insertion-ordered, not access-ordered LRU.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::EventsiftConfig;
use crate::models::QueryResult;

/// One cached result with its insertion timestamp.
#[derive(Debug, Clone)]
struct CacheEntry {
    result: QueryResult,
    inserted_at: Instant,
}

/// Thread-safe, TTL-bounded query cache.
///
/// All read-modify-write access goes through one mutex; operations are
/// O(entries) at worst and never perform I/O, so a single exclusion scope
/// per get/insert suffices. Lock poisoning fails open: a poisoned cache
/// behaves as a miss, since caching is an optimization, not correctness.
#[derive(Debug)]
pub struct QueryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    max_entries: usize,
    ttl: Duration,
}

impl QueryCache {
    /// Creates a cache with the given capacity and entry TTL.
    #[must_use]
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries,
            ttl,
        }
    }

    /// Creates a cache from configuration.
    #[must_use]
    pub fn from_config(config: &EventsiftConfig) -> Self {
        Self::new(
            config.cache_max_entries,
            Duration::from_secs(config.cache_ttl_secs),
        )
    }

    /// Looks up a cached result, expiring it if older than the TTL.
    #[must_use]
    pub fn get(&self, query: &str, context: &BTreeMap<String, String>) -> Option<QueryResult> {
        let key = cache_key(query, context);
        let Ok(mut entries) = self.entries.lock() else {
            return None;
        };
        match entries.get(&key) {
            Some(entry) if entry.inserted_at.elapsed() <= self.ttl => {
                debug!(key = %key, "query cache hit");
                Some(entry.result.clone())
            }
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Caches a result, evicting the oldest entry when full.
    pub fn insert(&self, query: &str, context: &BTreeMap<String, String>, result: QueryResult) {
        let key = cache_key(query, context);
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        if entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            key,
            CacheEntry {
                result,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Returns the number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    /// Returns true if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for QueryCache {
    /// Default: 100 entries, 5 minute TTL.
    fn default() -> Self {
        Self::from_config(&EventsiftConfig::default())
    }
}

/// Hashes query text and sorted context into a stable key.
fn cache_key(query: &str, context: &BTreeMap<String, String>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    for (k, v) in context {
        hasher.update([0u8]);
        hasher.update(k.as_bytes());
        hasher.update([0u8]);
        hasher.update(v.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueryMeta;

    fn context(session: &str) -> BTreeMap<String, String> {
        BTreeMap::from([("session".to_string(), session.to_string())])
    }

    fn result(note: &str) -> QueryResult {
        QueryResult {
            rows: Vec::new(),
            meta: QueryMeta {
                note: Some(note.to_string()),
                ..QueryMeta::default()
            },
        }
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = QueryCache::default();
        let ctx = context("s1");
        assert!(cache.get("select *", &ctx).is_none());
        cache.insert("select *", &ctx, result("one"));
        let hit = cache.get("select *", &ctx).unwrap();
        assert_eq!(hit.meta.note.as_deref(), Some("one"));
    }

    #[test]
    fn test_context_partitions_entries() {
        let cache = QueryCache::default();
        cache.insert("select *", &context("s1"), result("one"));
        assert!(cache.get("select *", &context("s2")).is_none());
    }

    #[test]
    fn test_ttl_expires_lazily() {
        let cache = QueryCache::new(10, Duration::from_millis(0));
        let ctx = context("s1");
        cache.insert("select *", &ctx, result("one"));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("select *", &ctx).is_none());
        // The expired entry was removed on read.
        assert!(cache.is_empty());
    }

    #[test]
    fn test_oldest_by_insertion_evicted() {
        let cache = QueryCache::new(2, Duration::from_secs(300));
        let ctx = context("s1");
        cache.insert("q1", &ctx, result("one"));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("q2", &ctx, result("two"));
        std::thread::sleep(Duration::from_millis(2));
        // q1 is read last, but eviction goes by insertion age, not access.
        assert!(cache.get("q1", &ctx).is_some());
        cache.insert("q3", &ctx, result("three"));
        assert!(cache.get("q1", &ctx).is_none());
        assert!(cache.get("q2", &ctx).is_some());
        assert!(cache.get("q3", &ctx).is_some());
    }

    #[test]
    fn test_len() {
        let cache = QueryCache::default();
        assert!(cache.is_empty());
        cache.insert("q1", &context("s1"), result("one"));
        assert_eq!(cache.len(), 1);
    }
}
