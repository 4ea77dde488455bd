//! Shared response cache subsystem.
//!
//! # Data Flow
//! ```text
//! Worker on cache hit:
//!     find(uri) → clone of the stored body → written to the client
//!
//! Worker on cache miss:
//!     origin response captured → insert(uri, body)
//!     → evict from the cold end until the body fits
//!     → new entry becomes the most recent
//! ```
//!
//! # Design Decisions
//! - Recency is insertion order: entries are prepended on insert and
//!   evicted from the opposite end. A find does not promote.
//! - Readers share a lock and clone an `Arc` of the body, so a stored
//!   body can be streamed to a client while a writer evicts the entry.
//! - Duplicate URIs may coexist after racing misses; find returns the
//!   more recently inserted one and both eventually evict.

use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::CacheConfig;
use crate::observability::metrics;

/// One cached response: the exact request-target bytes and the raw
/// bytes received from the origin (status line, headers and body).
struct CacheEntry {
    uri: Vec<u8>,
    body: Arc<[u8]>,
}

struct CacheInner {
    /// Most recent insertion at the front, eviction victim at the back.
    entries: VecDeque<CacheEntry>,
    /// Sum of body lengths over all entries.
    total_bytes: usize,
}

/// A bounded in-memory response cache shared by all workers.
///
/// Many lookups may run concurrently; insertion takes the write half of
/// the lock and is serialized with respect to every lookup.
pub struct ResponseCache {
    inner: RwLock<CacheInner>,
    max_total_bytes: usize,
    max_object_bytes: usize,
}

impl ResponseCache {
    /// Create an empty cache with the configured bounds.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            inner: RwLock::new(CacheInner {
                entries: VecDeque::new(),
                total_bytes: 0,
            }),
            max_total_bytes: config.max_total_bytes,
            max_object_bytes: config.max_object_bytes,
        }
    }

    /// Look up a response by its exact request target, compared
    /// byte-for-byte.
    ///
    /// Returns a handle to the stored bytes, or `None`. The scan runs
    /// front-to-back so the more recently inserted of two duplicate URIs
    /// wins.
    pub async fn find(&self, uri: &[u8]) -> Option<Arc<[u8]>> {
        let inner = self.inner.read().await;
        let hit = inner
            .entries
            .iter()
            .find(|entry| entry.uri == uri)
            .map(|entry| entry.body.clone());

        if hit.is_some() {
            metrics::record_cache_hit();
        } else {
            metrics::record_cache_miss();
        }
        hit
    }

    /// Insert a response body keyed by its request target.
    ///
    /// A body larger than the per-object bound is silently ignored.
    /// Otherwise entries are evicted from the cold end, one at a time,
    /// until the new body fits under the total bound.
    pub async fn insert(&self, uri: &[u8], body: Vec<u8>) {
        if body.len() > self.max_object_bytes {
            return;
        }

        let mut inner = self.inner.write().await;

        while inner.total_bytes + body.len() > self.max_total_bytes {
            match inner.entries.pop_back() {
                Some(victim) => {
                    inner.total_bytes -= victim.body.len();
                    metrics::record_cache_eviction();
                    tracing::debug!(
                        uri = %String::from_utf8_lossy(&victim.uri),
                        bytes = victim.body.len(),
                        "Cache entry evicted"
                    );
                }
                None => break,
            }
        }

        inner.total_bytes += body.len();
        inner.entries.push_front(CacheEntry {
            uri: uri.to_vec(),
            body: body.into(),
        });

        metrics::record_cache_insert();
        metrics::record_cache_bytes(inner.total_bytes);
    }

    /// Largest single body this cache will accept.
    pub fn max_object_bytes(&self) -> usize {
        self.max_object_bytes
    }

    /// Total bytes currently resident.
    pub async fn total_bytes(&self) -> usize {
        self.inner.read().await.total_bytes
    }

    /// Number of entries currently resident.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    #[cfg(test)]
    async fn assert_invariants(&self) {
        let inner = self.inner.read().await;
        let sum: usize = inner.entries.iter().map(|e| e.body.len()).sum();
        assert_eq!(inner.total_bytes, sum);
        assert!(inner.total_bytes <= self.max_total_bytes);
        for entry in &inner.entries {
            assert!(entry.body.len() <= self.max_object_bytes);
        }
        assert_eq!(inner.entries.is_empty(), inner.total_bytes == 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;

    fn small_cache(max_total: usize, max_object: usize) -> ResponseCache {
        ResponseCache::new(&CacheConfig {
            max_total_bytes: max_total,
            max_object_bytes: max_object,
        })
    }

    #[tokio::test]
    async fn test_find_miss_on_empty() {
        let cache = small_cache(1000, 100);
        assert!(cache.find(b"http://a/").await.is_none());
        cache.assert_invariants().await;
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let cache = small_cache(1000, 100);
        cache.insert(b"http://a/", b"hello".to_vec()).await;

        let body = cache.find(b"http://a/").await.unwrap();
        assert_eq!(&body[..], b"hello");
        assert_eq!(cache.total_bytes().await, 5);
        cache.assert_invariants().await;
    }

    #[tokio::test]
    async fn test_oversize_insert_is_noop() {
        let cache = small_cache(1000, 100);
        cache.insert(b"http://big/", vec![0u8; 101]).await;

        assert!(cache.find(b"http://big/").await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_exact_size_boundary() {
        let cache = small_cache(1000, 100);
        cache.insert(b"http://edge/", vec![0u8; 100]).await;
        assert!(cache.find(b"http://edge/").await.is_some());

        cache.insert(b"http://edge2/", vec![0u8; 101]).await;
        assert!(cache.find(b"http://edge2/").await.is_none());
        cache.assert_invariants().await;
    }

    #[tokio::test]
    async fn test_single_entry_eviction() {
        let cache = small_cache(100, 100);
        cache.insert(b"http://a/", vec![1u8; 80]).await;
        cache.insert(b"http://b/", vec![2u8; 80]).await;

        assert!(cache.find(b"http://a/").await.is_none());
        assert!(cache.find(b"http://b/").await.is_some());
        assert_eq!(cache.len().await, 1);
        cache.assert_invariants().await;
    }

    #[tokio::test]
    async fn test_eviction_by_total_size() {
        // Eleven 100 000-byte bodies against the production total bound:
        // the eleventh insert must push out the oldest entry and only it.
        let cache = small_cache(1_049_000, 102_400);
        for i in 1..=11 {
            cache.insert(format!("http://host/obj{}", i).as_bytes(), vec![0u8; 100_000]).await;
        }

        assert!(cache.find(b"http://host/obj1").await.is_none());
        for i in 2..=11 {
            assert!(
                cache.find(format!("http://host/obj{}", i).as_bytes()).await.is_some(),
                "obj{} should survive",
                i
            );
        }
        assert_eq!(cache.len().await, 10);
        assert_eq!(cache.total_bytes().await, 1_000_000);
        cache.assert_invariants().await;
    }

    #[tokio::test]
    async fn test_eviction_runs_oldest_first() {
        let cache = small_cache(300, 300);
        cache.insert(b"http://a/", vec![0u8; 100]).await;
        cache.insert(b"http://b/", vec![0u8; 100]).await;
        cache.insert(b"http://c/", vec![0u8; 100]).await;
        // Requires 200 bytes freed: a and b go, c stays.
        cache.insert(b"http://d/", vec![0u8; 200]).await;

        assert!(cache.find(b"http://a/").await.is_none());
        assert!(cache.find(b"http://b/").await.is_none());
        assert!(cache.find(b"http://c/").await.is_some());
        assert!(cache.find(b"http://d/").await.is_some());
        cache.assert_invariants().await;
    }

    #[tokio::test]
    async fn test_duplicate_uri_returns_most_recent() {
        let cache = small_cache(1000, 100);
        cache.insert(b"http://dup/", b"old".to_vec()).await;
        cache.insert(b"http://dup/", b"new".to_vec()).await;

        let body = cache.find(b"http://dup/").await.unwrap();
        assert_eq!(&body[..], b"new");
        assert_eq!(cache.len().await, 2);
        cache.assert_invariants().await;
    }

    #[tokio::test]
    async fn test_find_does_not_promote() {
        let cache = small_cache(200, 100);
        cache.insert(b"http://a/", vec![0u8; 100]).await;
        cache.insert(b"http://b/", vec![0u8; 100]).await;

        // Touching a must not save it: it is still the oldest insertion.
        assert!(cache.find(b"http://a/").await.is_some());
        cache.insert(b"http://c/", vec![0u8; 100]).await;

        assert!(cache.find(b"http://a/").await.is_none());
        assert!(cache.find(b"http://b/").await.is_some());
        cache.assert_invariants().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_readers_see_identical_bytes() {
        let cache = std::sync::Arc::new(small_cache(1000, 100));
        cache.insert(b"http://shared/", b"payload".to_vec()).await;

        let mut tasks = Vec::new();
        for _ in 0..100 {
            let cache = cache.clone();
            tasks.push(tokio::spawn(async move {
                cache.find(b"http://shared/").await.unwrap()
            }));
        }
        for task in tasks {
            let body = task.await.unwrap();
            assert_eq!(&body[..], b"payload");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_and_finds_keep_invariants() {
        let cache = std::sync::Arc::new(small_cache(500, 100));

        let mut tasks = Vec::new();
        for i in 0..8 {
            let cache = cache.clone();
            tasks.push(tokio::spawn(async move {
                for j in 0..50 {
                    let uri = format!("http://w{}/{}", i, j % 5);
                    if j % 2 == 0 {
                        cache.insert(uri.as_bytes(), vec![i as u8; 60]).await;
                    } else {
                        let _ = cache.find(uri.as_bytes()).await;
                    }
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        cache.assert_invariants().await;
    }
}
