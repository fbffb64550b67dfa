// ABOUTME: In-memory response cache with LRU eviction, TTL expiry, and gzip compression
// ABOUTME: Includes background sweep task for expired entries and hit/miss statistics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use std::time::Duration;

use lru::LruCache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;
use tracing::{debug, warn};

use super::compression::{compress_if_smaller, decompress};
use super::{CacheConfig, CacheStats};

/// Stored form of a cached value
enum Payload<V> {
    Plain(V),
    /// Gzip of the JSON encoding
    Compressed(Vec<u8>),
}

struct CacheEntry<V> {
    payload: Payload<V>,
    created_at: Instant,
    ttl: Duration,
    access_count: u64,
    last_accessed_at: Instant,
    size_bytes: usize,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.ttl
    }
}

struct CacheState<V> {
    entries: LruCache<String, CacheEntry<V>>,
    hits: u64,
    misses: u64,
    evictions: u64,
    compression_savings: u64,
    total_memory: usize,
}

impl<V> CacheState<V> {
    fn new() -> Self {
        Self {
            entries: LruCache::unbounded(),
            hits: 0,
            misses: 0,
            evictions: 0,
            compression_savings: 0,
            total_memory: 0,
        }
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        self.entries.pop(key).is_some_and(|entry| {
            self.total_memory = self.total_memory.saturating_sub(entry.size_bytes);
            true
        })
    }

    fn evict_until_below(&mut self, max_size: usize) {
        while self.entries.len() >= max_size {
            let Some((key, entry)) = self.entries.pop_lru() else {
                break;
            };
            self.total_memory = self.total_memory.saturating_sub(entry.size_bytes);
            self.evictions += 1;
            debug!(key = %key, accesses = entry.access_count, "Evicted least recently used cache entry");
        }
    }

    fn purge_expired(&mut self, now: Instant) -> usize {
        // Collect expired keys first (can't modify while iterating)
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }
        expired_keys.len()
    }
}

/// Bounded in-memory cache keyed by request key
///
/// Every operation takes the state lock once and never awaits while holding it, so a
/// lookup and the corresponding eviction or insert are never interleaved with another
/// caller. `LruCache` keeps entries ordered by last access, which makes the least
/// recently used entry an O(1) eviction.
///
/// The cache never fails a request: encoding problems degrade to a zero-size estimate
/// and a payload that cannot be restored is treated as a miss.
pub struct ResponseCache<V> {
    state: Arc<Mutex<CacheState<V>>>,
    config: CacheConfig,
    /// Dropping the cache drops this sender, which stops the sweep task
    _shutdown_tx: Option<mpsc::Sender<()>>,
}

impl<V> ResponseCache<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + 'static,
{
    /// Create a cache, spawning the sweep task when enabled and a runtime is available
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        let state = Arc::new(Mutex::new(CacheState::new()));

        let shutdown_tx = if config.enable_background_cleanup {
            Self::spawn_sweeper(Arc::clone(&state), config.ttl)
        } else {
            None
        };

        Self {
            state,
            config,
            _shutdown_tx: shutdown_tx,
        }
    }

    fn spawn_sweeper(
        state: Arc<Mutex<CacheState<V>>>,
        period: Duration,
    ) -> Option<mpsc::Sender<()>> {
        if period.is_zero() {
            return None;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No tokio runtime available, cache sweep disabled");
            return None;
        };

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let removed = state.lock().await.purge_expired(Instant::now());
                        if removed > 0 {
                            debug!("Swept {removed} expired cache entries");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Cache sweep task stopped");
                        break;
                    }
                }
            }
        });

        Some(shutdown_tx)
    }

    /// Configuration the cache was built with
    #[must_use]
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up a value, refreshing its recency on a hit
    pub async fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut state = self.state.lock().await;

        let expired = match state.entries.peek(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                state.misses += 1;
                return None;
            }
        };
        if expired {
            state.remove_entry(key);
            state.misses += 1;
            debug!(key = %key, "Cache entry expired");
            return None;
        }

        let restored = state.entries.get_mut(key).and_then(|entry| {
            entry.access_count += 1;
            entry.last_accessed_at = now;
            match &entry.payload {
                Payload::Plain(value) => Some(value.clone()),
                Payload::Compressed(bytes) => {
                    decompress(bytes).and_then(|raw| serde_json::from_slice(&raw).ok())
                }
            }
        });

        if restored.is_some() {
            state.hits += 1;
        } else {
            warn!(key = %key, "Dropping cache entry that could not be restored");
            state.remove_entry(key);
            state.misses += 1;
        }
        restored
    }

    /// Store a value, evicting least recently used entries when full
    ///
    /// The TTL clock starts now and runs for `ttl` or the configured default.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let encoded = serde_json::to_vec(&value).ok();
        let raw_size = encoded.as_ref().map_or(0, Vec::len);

        let (payload, size_bytes, savings) = match encoded {
            Some(bytes) if self.config.compress && raw_size > self.config.compression_threshold => {
                match compress_if_smaller(&bytes) {
                    Some(compressed) => {
                        let len = compressed.len();
                        (Payload::Compressed(compressed), len, raw_size - len)
                    }
                    None => (Payload::Plain(value), raw_size, 0),
                }
            }
            _ => (Payload::Plain(value), raw_size, 0),
        };

        let now = Instant::now();
        let entry = CacheEntry {
            payload,
            created_at: now,
            ttl: ttl.unwrap_or(self.config.ttl),
            access_count: 0,
            last_accessed_at: now,
            size_bytes,
        };

        let mut state = self.state.lock().await;
        if !state.remove_entry(&key) {
            state.evict_until_below(self.config.max_size.max(1));
        }
        state.compression_savings += savings as u64;
        state.total_memory += size_bytes;
        state.entries.put(key, entry);
    }

    /// Equivalent to `get(key).is_some()`, with the same side effects
    pub async fn has(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }

    /// Remove one entry, returning whether it existed
    pub async fn delete(&self, key: &str) -> bool {
        self.state.lock().await.remove_entry(key)
    }

    /// Remove every entry; counters are kept
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.entries.clear();
        state.total_memory = 0;
    }

    /// Remove every expired entry regardless of access, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        self.state.lock().await.purge_expired(Instant::now())
    }

    /// Number of stored entries, including expired ones not yet swept
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of hit/miss/eviction counters and memory usage
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        let entries = state.entries.len();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            hit_rate: CacheStats::hit_rate_percent(state.hits, state.misses),
            evictions: state.evictions,
            compression_savings_bytes: state.compression_savings,
            entries,
            total_memory_bytes: state.total_memory,
            average_entry_bytes: state.total_memory.checked_div(entries).unwrap_or(0),
        }
    }
}
