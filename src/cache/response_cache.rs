//! In-memory TTL response cache.
//!
//! Keys are the literal target URL string, query string included; no
//! normalization is applied, so URLs differing by trailing slash or
//! parameter order are distinct entries. Only GET responses with a 2xx
//! status are ever stored (the handler enforces this).

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::CacheConfig;
use crate::observability::metrics;

/// A captured upstream response.
///
/// Headers are stored post-filtering, so a cached entry can be written back
/// to a caller as-is.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() >= ttl
    }
}

/// A thread-safe TTL cache mapping target URLs to captured responses.
///
/// TTL is fixed at construction, not per-entry. Expiry is lazy on `get`,
/// with a background sweep (see [`ResponseCache::sweep_expired`]) reclaiming
/// entries nothing reads again. An optional capacity bound evicts the
/// oldest entry on overflow; by default the cache is unbounded.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: Option<usize>,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl: Duration::from_secs(config.ttl_secs),
            max_entries: config.max_entries,
        }
    }

    /// Look up a non-expired entry. Expired entries are removed on the way
    /// out and reported as absent.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        {
            let entry = self.inner.get(key)?;
            if !entry.is_expired(self.ttl) {
                return Some(entry.value().clone());
            }
            // Read guard must drop before taking the shard write lock below.
        }
        self.inner.remove_if(key, |_, entry| entry.is_expired(self.ttl));
        metrics::record_cache_size(self.inner.len());
        None
    }

    /// Store or overwrite an entry, visible to subsequent `get` calls
    /// immediately and atomically.
    pub fn set(&self, key: String, status: StatusCode, headers: HeaderMap, body: Bytes) {
        if let Some(max) = self.max_entries {
            if self.inner.len() >= max && !self.inner.contains_key(&key) {
                self.evict_oldest();
            }
        }
        self.inner.insert(
            key,
            CacheEntry {
                status,
                headers,
                body,
                stored_at: Instant::now(),
            },
        );
        metrics::record_cache_size(self.inner.len());
    }

    /// Remove every expired entry. Called periodically by the sweep task.
    pub fn sweep_expired(&self) {
        let ttl = self.ttl;
        self.inner.retain(|_, entry| !entry.is_expired(ttl));
        metrics::record_cache_size(self.inner.len());
    }

    /// Number of entries currently held, expired stragglers included.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn evict_oldest(&self) {
        let oldest = self
            .inner
            .iter()
            .min_by_key(|entry| entry.stored_at)
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            self.inner.remove(&key);
        }
    }

    /// Spawn the background sweep, stopping when shutdown is signalled.
    pub fn spawn_sweeper(
        &self,
        interval: Duration,
        mut shutdown: tokio::sync::broadcast::Receiver<()>,
    ) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let before = cache.len();
                        cache.sweep_expired();
                        let after = cache.len();
                        if before != after {
                            tracing::debug!(evicted = before - after, remaining = after, "Cache sweep");
                        }
                    }
                    _ = shutdown.recv() => {
                        tracing::debug!("Cache sweeper stopping");
                        break;
                    }
                }
            }
        })
    }
}
