// ABOUTME: Response cache abstraction with TTL, LRU eviction, and optional compression
// ABOUTME: Configuration and statistics types shared by the in-memory backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Gzip helpers for large payloads
pub mod compression;
/// In-memory cache implementation
pub mod memory;

pub use memory::ResponseCache;

use std::env;
use std::time::Duration;

use serde::Serialize;
use whoop_core::constants::cache::{
    COMPRESSION_THRESHOLD_BYTES, DEFAULT_CACHE_MAX_SIZE, DEFAULT_CACHE_TTL_SECS,
};

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Default entry lifetime, also the period of the background sweep
    pub ttl: Duration,
    /// LRU eviction threshold (maximum number of entries)
    pub max_size: usize,
    /// Enable size-based gzip compression of stored values
    pub compress: bool,
    /// Values larger than this many bytes are compression candidates
    pub compression_threshold: usize,
    /// Enable background sweep task (requires a running tokio runtime)
    pub enable_background_cleanup: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            max_size: DEFAULT_CACHE_MAX_SIZE,
            compress: false,
            compression_threshold: COMPRESSION_THRESHOLD_BYTES,
            enable_background_cleanup: true,
        }
    }
}

impl CacheConfig {
    /// Load cache configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl: env::var("WHOOP_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.ttl, Duration::from_secs),
            max_size: env::var("WHOOP_CACHE_MAX_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_size),
            compress: env::var("WHOOP_CACHE_COMPRESS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.compress),
            ..defaults
        }
    }
}

/// Point-in-time cache statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Successful lookups
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
    /// `hits / (hits + misses)` as a percentage, 0 when idle
    pub hit_rate: f64,
    /// Entries removed by LRU pressure
    pub evictions: u64,
    /// Bytes saved by compression across all stored values
    pub compression_savings_bytes: u64,
    /// Entries currently stored
    pub entries: usize,
    /// Tracked size of every stored entry
    pub total_memory_bytes: usize,
    /// `total_memory_bytes / entries`, 0 when empty
    pub average_entry_bytes: usize,
}

impl CacheStats {
    pub(crate) fn hit_rate_percent(hits: u64, misses: u64) -> f64 {
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64 * 100.0
        }
    }
}
