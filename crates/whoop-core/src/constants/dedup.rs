// ABOUTME: Request deduplication defaults for the single-flight coordinator
// ABOUTME: Window, concurrency ceiling, slot poll interval, and batch window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Window in which identical keys collapse onto one execution
pub const DEFAULT_DEDUP_WINDOW_MS: u64 = 100;

/// Ceiling on distinct keys executing at the same time
pub const DEFAULT_MAX_CONCURRENT: usize = 10;

/// Interval at which callers re-check for a free concurrency slot
pub const SLOT_POLL_INTERVAL_MS: u64 = 10;

/// Window in which same-family calls are gathered into one batch
pub const DEFAULT_BATCH_WINDOW_MS: u64 = 10;
