// ABOUTME: Cache-related constants for TTL, capacity, and compression thresholds
// ABOUTME: Per-resource TTLs reflect how often each WHOOP resource changes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Default maximum cache entries
pub const DEFAULT_CACHE_MAX_SIZE: usize = 1_000;

/// Default entry lifetime, also the background sweep period
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300; // 5 minutes

/// Payloads above this size are candidates for compression
pub const COMPRESSION_THRESHOLD_BYTES: usize = 1_024;

/// Compressed form is kept only if it is at most this fraction of the original
pub const COMPRESSION_MAX_RATIO: f64 = 0.8;

/// Profile cache TTL (24 hours) - profiles change infrequently
pub const TTL_PROFILE_SECS: u64 = 86_400;

/// Body measurement cache TTL (6 hours)
pub const TTL_BODY_MEASUREMENT_SECS: u64 = 21_600;

/// Collection cache TTL (15 minutes) - needs to be fresh for new records
pub const TTL_COLLECTION_SECS: u64 = 900;

/// Single record cache TTL (1 hour) - scored records rarely change
pub const TTL_RECORD_SECS: u64 = 3_600;
