// ABOUTME: Shared test utilities for WHOOP client integration tests
// ABOUTME: Scripted transport, counting token refresher, recording hooks and fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `whoop_client`

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use whoop_client::cache::CacheConfig;
use whoop_client::dedup::DedupConfig;
use whoop_client::http_client::{
    HttpTransport, RequestHooks, RequestStart, RequestSummary, TransportError, TransportRequest,
    TransportResponse,
};
use whoop_client::models::OAuthTokenSet;
use whoop_client::oauth2_client::TokenRefresher;
use whoop_client::retry::RetryConfig;
use whoop_client::{ClientConfig, ClientError, ClientResult};

pub type TransportResult = Result<TransportResponse, TransportError>;

/// Build a JSON response with the given status
pub fn json_response(status: u16, body: &Value) -> TransportResult {
    Ok(TransportResponse {
        status,
        headers: HashMap::new(),
        body: body.to_string(),
    })
}

/// Build a response with a raw body and headers
pub fn raw_response(status: u16, body: &str, headers: &[(&str, &str)]) -> TransportResult {
    Ok(TransportResponse {
        status,
        headers: headers
            .iter()
            .map(|(k, v)| ((*k).to_ascii_lowercase(), (*v).to_owned()))
            .collect(),
        body: body.to_owned(),
    })
}

/// Transport that replays queued responses, then repeats a fallback
pub struct ScriptedTransport {
    queue: Mutex<VecDeque<TransportResult>>,
    fallback: TransportResult,
    delay: Duration,
    calls: AtomicUsize,
    authorizations: Mutex<Vec<Option<String>>>,
}

impl ScriptedTransport {
    pub fn new(fallback: TransportResult) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            authorizations: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(body: &Value) -> Self {
        Self::new(json_response(200, body))
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn then(self, response: TransportResult) -> Self {
        self.queue.lock().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn authorizations(&self) -> Vec<Option<String>> {
        self.authorizations.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> TransportResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let authorization = request
            .headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
            .map(|(_, value)| value.clone());
        self.authorizations.lock().unwrap().push(authorization);

        if !self.delay.is_zero() {
            tokio::select! {
                () = tokio::time::sleep(self.delay) => {}
                () = request.cancel.cancelled() => return Err(TransportError::Aborted),
            }
        }

        let next = self.queue.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Token refresher that counts calls and hands out numbered access tokens
pub struct CountingRefresher {
    calls: AtomicUsize,
    delay: Duration,
    fail: AtomicBool,
    fail_status: AtomicU16,
    rotate_refresh_token: bool,
    received: Mutex<Vec<String>>,
}

impl CountingRefresher {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            fail: AtomicBool::new(false),
            fail_status: AtomicU16::new(400),
            rotate_refresh_token: false,
            received: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn rotating(mut self) -> Self {
        self.rotate_refresh_token = true;
        self
    }

    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Fail every refresh with the token endpoint answering `status`
    pub fn fail_with_status(&self, status: u16) {
        self.fail_status.store(status, Ordering::SeqCst);
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenRefresher for CountingRefresher {
    async fn refresh(&self, refresh_token: &str) -> ClientResult<OAuthTokenSet> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.received.lock().unwrap().push(refresh_token.to_owned());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            let status = self.fail_status.load(Ordering::SeqCst);
            let error = if status == 401 {
                "invalid_client"
            } else {
                "invalid_grant"
            };
            return Err(ClientError::token_endpoint(
                format!("Token request failed with status {status}"),
                status,
                Some(error.to_owned()),
                Some("refresh token revoked".to_owned()),
            ));
        }
        let refresh = self
            .rotate_refresh_token
            .then(|| format!("refresh-{n}"));
        Ok(OAuthTokenSet::new(format!("access-{n}"), refresh, 3600))
    }
}

/// Hooks that count every notification
#[derive(Default)]
pub struct RecordingHooks {
    pub starts: AtomicUsize,
    pub ends: AtomicUsize,
    pub cache_hits: AtomicUsize,
    pub slow: AtomicUsize,
    pub summaries: Mutex<Vec<RequestSummary>>,
}

impl RequestHooks for RecordingHooks {
    fn on_request_start(&self, _request: &RequestStart) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_request_end(&self, summary: &RequestSummary) {
        self.ends.fetch_add(1, Ordering::SeqCst);
        self.summaries.lock().unwrap().push(summary.clone());
    }

    fn on_cache_hit(&self, _key: &str) {
        self.cache_hits.fetch_add(1, Ordering::SeqCst);
    }

    fn on_slow_request(&self, _summary: &RequestSummary) {
        self.slow.fetch_add(1, Ordering::SeqCst);
    }
}

/// Client configuration pointed at `base_url` with fast retries and no sweep task
pub fn test_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        base_url: base_url.to_owned(),
        default_timeout: Duration::from_secs(5),
        retry: RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
        },
        cache: CacheConfig {
            enable_background_cleanup: false,
            ..CacheConfig::default()
        },
        deduplication: DedupConfig::default(),
        ..ClientConfig::default()
    }
}

/// Token set that stays valid for an hour
pub fn fresh_tokens() -> OAuthTokenSet {
    OAuthTokenSet::new("initial-access", Some("initial-refresh".to_owned()), 3600)
}

/// Shared refresher handle usable as both the concrete type and the trait object
pub fn refresher(refresher: CountingRefresher) -> (Arc<CountingRefresher>, Arc<dyn TokenRefresher>) {
    let concrete = Arc::new(refresher);
    let dynamic: Arc<dyn TokenRefresher> = concrete.clone();
    (concrete, dynamic)
}

pub fn profile_json() -> Value {
    json!({
        "user_id": 10129,
        "email": "jsmith@whoop.test",
        "first_name": "John",
        "last_name": "Smith"
    })
}

pub fn cycle_json(id: i64) -> Value {
    json!({
        "id": id,
        "user_id": 10129,
        "created_at": "2025-01-10T11:25:44.774Z",
        "updated_at": "2025-01-10T14:25:44.774Z",
        "start": "2025-01-10T02:25:44.774Z",
        "end": "2025-01-11T02:25:44.774Z",
        "timezone_offset": "-05:00",
        "score_state": "SCORED",
        "score": {
            "strain": 5.292_166_709_899_9,
            "kilojoule": 8288.297_060_528_012,
            "average_heart_rate": 68,
            "max_heart_rate": 141
        }
    })
}
