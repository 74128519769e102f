//! Session-lifetime memoization of structured query results.
//!
//! A UI that enumerates a directory and then immediately stats every entry
//! issues bursts of identical queries; this cache absorbs them. Entries live
//! for the lifetime of the provider instance, with no TTL and no eviction —
//! a deliberate simplicity trade-off for a short-lived browsing session.
//!
//! Keys combine the object identifier with a digest of the requested field
//! shape, so a `stat` result can never be served for a `read_directory`
//! probe against the same path.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Mutex;

use sha2::{Digest, Sha256};

use crate::util::Flight;

// =============================================================================
// CacheKey
// =============================================================================

/// Composite cache key: identifier plus field-shape digest.
///
/// Structured rather than concatenated, so differently shaped queries
/// against the same path cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Stringified object identifier.
    pub path: String,
    /// Lowercase-hex SHA-256 of the requested field set.
    pub shape: String,
}

impl CacheKey {
    /// Build a key from an identifier and the field selection it queries.
    pub fn new(path: impl Into<String>, fields: &str) -> Self {
        let digest = {
            let mut hasher = Sha256::new();
            hasher.update(fields.as_bytes());
            format!("{:x}", hasher.finalize())
        };
        Self {
            path: path.into(),
            shape: digest,
        }
    }
}

// =============================================================================
// QueryCache
// =============================================================================

/// Memoizes the result of a (identifier, field-shape) query for the session.
///
/// `get_or_compute` coalesces concurrent misses for the same key into one
/// producer run, caches producer successes — including an explicit
/// "not found" when the value type is an `Option` — and passes producer
/// errors through uncached, so a transport blip never poisons the session.
pub struct QueryCache<V, E> {
    entries: Mutex<HashMap<CacheKey, V>>,
    flight: Flight<CacheKey, V, E>,
}

impl<V, E> QueryCache<V, E>
where
    V: Clone,
    E: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            flight: Flight::new(),
        }
    }

    /// Look up `key`, running `producer` on a miss.
    pub async fn get_or_compute<F, Fut>(&self, key: CacheKey, producer: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.entries.lock().unwrap().get(&key) {
            return Ok(value.clone());
        }

        self.flight
            .run(key.clone(), || async {
                let value = producer().await?;
                self.entries.lock().unwrap().insert(key, value.clone());
                Ok(value)
            })
            .await
    }

    /// Number of memoized entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

impl<V, E> Default for QueryCache<V, E>
where
    V: Clone,
    E: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn same_path_different_shapes_never_collide() {
        let a = CacheKey::new("hubfs://github.com/o/r/f", "__typename");
        let b = CacheKey::new("hubfs://github.com/o/r/f", "entries { name type }");
        assert_eq!(a.path, b.path);
        assert_ne!(a.shape, b.shape);
        assert_ne!(a, b);
    }

    #[test]
    fn identical_inputs_produce_identical_keys() {
        let a = CacheKey::new("p", "fields");
        let b = CacheKey::new("p", "fields");
        assert_eq!(a, b);
        assert_eq!(a.shape.len(), 64); // SHA-256 hex
    }

    #[tokio::test]
    async fn second_lookup_skips_the_producer() {
        let cache: QueryCache<Option<String>, ()> = QueryCache::new();
        let runs = AtomicU32::new(0);

        for _ in 0..2 {
            let value = cache
                .get_or_compute(CacheKey::new("p", "f"), || {
                    runs.fetch_add(1, Ordering::SeqCst);
                    async { Ok(Some("v".to_string())) }
                })
                .await;
            assert_eq!(value, Ok(Some("v".to_string())));
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn not_found_marker_is_cached() {
        let cache: QueryCache<Option<String>, ()> = QueryCache::new();
        let runs = AtomicU32::new(0);

        for _ in 0..2 {
            let value = cache
                .get_or_compute(CacheKey::new("missing", "f"), || {
                    runs.fetch_add(1, Ordering::SeqCst);
                    async { Ok(None) }
                })
                .await;
            assert_eq!(value, Ok(None));
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn producer_errors_are_not_cached() {
        let cache: QueryCache<Option<String>, String> = QueryCache::new();
        let runs = AtomicU32::new(0);

        let first = cache
            .get_or_compute(CacheKey::new("p", "f"), || {
                runs.fetch_add(1, Ordering::SeqCst);
                async { Err("network down".to_string()) }
            })
            .await;
        assert!(first.is_err());
        assert!(cache.is_empty());

        let second = cache
            .get_or_compute(CacheKey::new("p", "f"), || {
                runs.fetch_add(1, Ordering::SeqCst);
                async { Ok(Some("recovered".to_string())) }
            })
            .await;
        assert_eq!(second, Ok(Some("recovered".to_string())));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_misses_coalesce() {
        let cache: Arc<QueryCache<Option<i32>, ()>> = Arc::new(QueryCache::new());
        let runs = Arc::new(AtomicU32::new(0));

        let mut handles = vec![];
        for _ in 0..6 {
            let cache = Arc::clone(&cache);
            let runs = Arc::clone(&runs);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_compute(CacheKey::new("p", "f"), || {
                        let runs = Arc::clone(&runs);
                        async move {
                            runs.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                            Ok(Some(1))
                        }
                    })
                    .await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(Some(1)));
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
