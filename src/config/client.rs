// ABOUTME: Top-level client configuration composed of per-component settings
// ABOUTME: Environment loading with explicit defaults and up-front validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::time::Duration;

use tracing::debug;
use url::Url;
use whoop_core::constants::api::DEFAULT_API_BASE_URL;
use whoop_core::constants::retry::{DEFAULT_SLOW_REQUEST_MS, DEFAULT_TIMEOUT_MS};
use whoop_core::{ClientError, ClientResult};

use crate::cache::CacheConfig;
use crate::dedup::DedupConfig;
use crate::retry::RetryConfig;

/// Settings for a [`crate::WhoopClient`] and its request pipeline
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API origin and path prefix, e.g. `https://api.prod.whoop.com/developer`
    pub base_url: String,
    /// Per-request network timeout
    pub default_timeout: Duration,
    /// Attempt cap and backoff delays
    pub retry: RetryConfig,
    /// Requests slower than this fire the slow-request hook
    pub slow_request_threshold: Duration,
    /// Response cache
    pub cache: CacheConfig,
    /// Request deduplication
    pub deduplication: DedupConfig,
    /// `User-Agent` header sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_owned(),
            default_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            retry: RetryConfig::default(),
            slow_request_threshold: Duration::from_millis(DEFAULT_SLOW_REQUEST_MS),
            cache: CacheConfig::default(),
            deduplication: DedupConfig::default(),
            user_agent: concat!("whoop-client/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            base_url: env::var("WHOOP_API_BASE_URL").unwrap_or(defaults.base_url),
            default_timeout: env::var("WHOOP_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.default_timeout, Duration::from_millis),
            retry: env::var("WHOOP_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or_else(
                    || defaults.retry.clone(),
                    |attempts| defaults.retry.with_max_attempts(attempts),
                ),
            slow_request_threshold: env::var("WHOOP_SLOW_REQUEST_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.slow_request_threshold, Duration::from_millis),
            cache: CacheConfig::from_env(),
            deduplication: DedupConfig::from_env(),
            user_agent: defaults.user_agent,
        };
        debug!(base_url = %config.base_url, "Loaded WHOOP client configuration");
        config
    }

    /// Check the configuration before any request is made
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unparseable or non-HTTP base URL, a zero
    /// timeout, zero retry attempts, a zero cache size, or a zero concurrency ceiling
    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::config(format!("Invalid base URL {}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::config(format!(
                "Base URL must use http or https, got {}",
                url.scheme()
            )));
        }
        if self.default_timeout.is_zero() {
            return Err(ClientError::config("Request timeout must be greater than zero"));
        }
        if self.retry.max_attempts == 0 {
            return Err(ClientError::config("Retry attempts must be at least 1"));
        }
        if self.cache.max_size == 0 {
            return Err(ClientError::config("Cache max size must be at least 1"));
        }
        if self.deduplication.max_concurrent == 0 {
            return Err(ClientError::config(
                "Deduplication concurrency ceiling must be at least 1",
            ));
        }
        Ok(())
    }
}
