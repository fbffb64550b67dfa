// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for the WHOOP API client grouped by concern
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.

/// WHOOP API base URL, endpoint paths and collection limits
pub mod api;
/// Cache-related constants (TTL, sizes, compression)
pub mod cache;
/// Request deduplication defaults
pub mod dedup;
/// OAuth endpoints and token lifecycle constants
pub mod oauth;
/// Retry, backoff and timeout defaults
pub mod retry;
/// Unit conversion and measurement constants
pub mod units;
