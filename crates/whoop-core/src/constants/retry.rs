// ABOUTME: Retry, backoff, and timeout defaults for outbound requests
// ABOUTME: Values consumed by the retry policy and the error taxonomy hints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Attempts made before the last error is surfaced
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// First backoff delay in milliseconds (doubles per attempt)
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;

/// Upper bound for any single backoff delay
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

/// Lower bound of the jitter factor applied to exponential delays
pub const JITTER_MIN: f64 = 0.5;

/// Upper bound (exclusive) of the jitter factor
pub const JITTER_MAX: f64 = 1.0;

/// Delay used for rate limits without a `Retry-After` header
pub const RATE_LIMIT_DEFAULT_RETRY_SECS: u64 = 60;

/// Delay hint for network and timeout failures
pub const NETWORK_RETRY_HINT_MS: u64 = 1_000;

/// Per-request network timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Requests slower than this fire the slow-request hook
pub const DEFAULT_SLOW_REQUEST_MS: u64 = 5_000;

/// Connection establishment timeout for the shared HTTP client
pub const CONNECT_TIMEOUT_SECS: u64 = 10;
