// ABOUTME: Fire-and-forget observability hooks for pipeline requests
// ABOUTME: Default tracing implementation logs start, end, cache hits and slow requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::transport::HttpMethod;

/// How the cache participated in a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// Served from cache
    Hit,
    /// Looked up and not found
    Miss,
    /// Not consulted (non-GET or skipped by the caller)
    Bypass,
}

/// A request about to run
#[derive(Debug, Clone)]
pub struct RequestStart {
    /// Correlates start and end notifications
    pub request_id: Uuid,
    /// Method
    pub method: HttpMethod,
    /// Absolute URL
    pub url: String,
}

/// A finished request
#[derive(Debug, Clone)]
pub struct RequestSummary {
    /// Correlates start and end notifications
    pub request_id: Uuid,
    /// Method
    pub method: HttpMethod,
    /// Absolute URL
    pub url: String,
    /// Wall time including cache, dedup wait and retries
    pub duration: Duration,
    /// Cache participation
    pub cache_status: CacheStatus,
    /// Attempts beyond the first made by this caller
    pub retries: u32,
    /// Whether the caller received a value
    pub success: bool,
}

/// Observer for pipeline events; every method defaults to a no-op
pub trait RequestHooks: Send + Sync {
    /// Request accepted by the pipeline
    fn on_request_start(&self, _request: &RequestStart) {}
    /// Request finished, successfully or not
    fn on_request_end(&self, _summary: &RequestSummary) {}
    /// GET served from cache
    fn on_cache_hit(&self, _key: &str) {}
    /// Request took longer than the configured threshold
    fn on_slow_request(&self, _summary: &RequestSummary) {}
}

/// Hooks that ignore every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl RequestHooks for NoopHooks {}

/// Hooks that log through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHooks;

impl RequestHooks for TracingHooks {
    fn on_request_start(&self, request: &RequestStart) {
        debug!(
            request_id = %request.request_id,
            method = %request.method,
            url = %request.url,
            "WHOOP request started"
        );
    }

    fn on_request_end(&self, summary: &RequestSummary) {
        debug!(
            request_id = %summary.request_id,
            method = %summary.method,
            duration_ms = summary.duration.as_millis() as u64,
            cache = ?summary.cache_status,
            retries = summary.retries,
            success = summary.success,
            "WHOOP request finished"
        );
    }

    fn on_cache_hit(&self, key: &str) {
        debug!(key = %key, "Served from cache");
    }

    fn on_slow_request(&self, summary: &RequestSummary) {
        warn!(
            request_id = %summary.request_id,
            url = %summary.url,
            duration_ms = summary.duration.as_millis() as u64,
            "Slow WHOOP request"
        );
    }
}
