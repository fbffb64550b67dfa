// ABOUTME: Request pipeline composing cache, deduplication, bearer tokens and retries
// ABOUTME: Refreshes the token once on a 401 and surfaces the original error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Request Pipeline
//!
//! Every outbound call runs through the same stages:
//!
//! 1. Build the URL and derive a key from method, URL and body
//! 2. GET only: serve from the cache when possible
//! 3. Deduplicate concurrent identical requests
//! 4. Attach a bearer token and send through the retry policy, bounded by a timeout
//!    and the caller's cancellation token
//! 5. On a 401, refresh the token once; the 401 is still returned to the caller
//! 6. GET only: store the successful response
//!
//! None of the stages wrap errors from the others.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;
use whoop_core::{ClientError, ClientResult};

use super::hooks::{CacheStatus, RequestHooks, RequestStart, RequestSummary, TracingHooks};
use super::request_key;
use super::transport::{
    HttpMethod, HttpTransport, ReqwestTransport, TransportError, TransportRequest,
};
use crate::cache::{CacheStats, ResponseCache};
use crate::config::ClientConfig;
use crate::dedup::{DedupStats, Deduplicator, ExecuteOptions};
use crate::oauth2_client::TokenManager;
use crate::retry::{with_retry, RetryConfig};

/// Per-call overrides
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Neither read nor write the cache
    pub skip_cache: bool,
    /// Run the request on its own, outside deduplication
    pub skip_dedup: bool,
    /// Cache lifetime for this response instead of the default
    pub cache_ttl: Option<Duration>,
    /// Attempt cap instead of the configured one
    pub max_retries: Option<u32>,
    /// Network timeout instead of the configured one
    pub timeout: Option<Duration>,
    /// Caller-controlled abort signal
    pub cancel: Option<CancellationToken>,
    /// Extra headers
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    /// Options with a cache lifetime
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Options that bypass the cache
    #[must_use]
    pub fn skip_cache(mut self) -> Self {
        self.skip_cache = true;
        self
    }

    /// Options with an abort signal
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Options with a timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Options with an attempt cap
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

/// The HTTP call shared by every caller attached to one dedup key
struct Execution {
    transport: Arc<dyn HttpTransport>,
    token_manager: Option<Arc<TokenManager>>,
    method: HttpMethod,
    url: Url,
    body: Option<Value>,
    headers: Vec<(String, String)>,
    retry: RetryConfig,
    timeout: Duration,
    cancel: Option<CancellationToken>,
    attempts: Arc<AtomicU32>,
}

impl Execution {
    async fn run(self) -> ClientResult<Value> {
        let outcome = with_retry(|| self.attempt(), &self.retry, self.cancel.as_ref()).await;
        if let Err(error) = &outcome {
            if error.is_unauthorized() {
                self.refresh_after_unauthorized().await;
            }
        }
        outcome
    }

    async fn attempt(&self) -> ClientResult<Value> {
        self.attempts.fetch_add(1, Ordering::Relaxed);

        let mut headers = self.headers.clone();
        if let Some(manager) = &self.token_manager {
            let token = manager.get_valid_access_token().await?;
            headers.push(("Authorization".to_owned(), format!("Bearer {token}")));
        }

        let leg = self
            .cancel
            .as_ref()
            .map_or_else(CancellationToken::new, CancellationToken::child_token);
        let request = TransportRequest {
            method: self.method,
            url: self.url.clone(),
            headers,
            body: self.body.clone(),
            cancel: leg.clone(),
        };

        let sent = tokio::select! {
            biased;
            () = leg.cancelled() => Err(TransportError::Aborted),
            () = tokio::time::sleep(self.timeout) => {
                leg.cancel();
                Err(TransportError::Aborted)
            }
            result = self.transport.send(request) => result,
        };

        let response = sent.map_err(|error| match error {
            TransportError::Aborted => ClientError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            },
            TransportError::Connect(message) | TransportError::Other(message) => {
                ClientError::network(message)
            }
        })?;

        if !response.is_success() {
            return Err(ClientError::from_status(
                response.status,
                &response.body,
                self.url.path(),
                response.retry_after_secs(),
            ));
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&response.body).unwrap_or_else(|_| Value::String(response.body)))
    }

    async fn refresh_after_unauthorized(&self) {
        let Some(manager) = &self.token_manager else {
            return;
        };
        match manager.refresh_access_token(None).await {
            Ok(_) => info!(url = %self.url, "Refreshed access token after 401"),
            Err(e) => {
                warn!(url = %self.url, "Token refresh after 401 failed, clearing tokens: {e}");
                manager.clear_tokens();
            }
        }
    }
}

/// Single-origin request executor
///
/// Cache, deduplicator and token manager are shared through `Arc`; pass the same
/// instances to several pipelines to share state between them.
pub struct RequestPipeline {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    cache: Arc<ResponseCache<Value>>,
    dedup: Arc<Deduplicator<Value>>,
    token_manager: Option<Arc<TokenManager>>,
    hooks: Arc<dyn RequestHooks>,
    retry: RetryConfig,
    default_timeout: Duration,
    slow_request_threshold: Duration,
    default_headers: Vec<(String, String)>,
}

impl RequestPipeline {
    /// Build a pipeline with a reqwest transport and fresh cache and deduplicator
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            transport: Arc::new(ReqwestTransport::new()),
            cache: Arc::new(ResponseCache::new(config.cache.clone())),
            dedup: Arc::new(Deduplicator::new(config.deduplication.clone())),
            token_manager: None,
            hooks: Arc::new(TracingHooks),
            retry: config.retry.clone(),
            default_timeout: config.default_timeout,
            slow_request_threshold: config.slow_request_threshold,
            default_headers: vec![
                ("Accept".to_owned(), "application/json".to_owned()),
                ("User-Agent".to_owned(), config.user_agent.clone()),
            ],
        })
    }

    /// Replace the transport
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Use a shared cache
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<ResponseCache<Value>>) -> Self {
        self.cache = cache;
        self
    }

    /// Use a shared deduplicator
    #[must_use]
    pub fn with_deduplicator(mut self, dedup: Arc<Deduplicator<Value>>) -> Self {
        self.dedup = dedup;
        self
    }

    /// Attach bearer tokens from `manager` and refresh on 401
    #[must_use]
    pub fn with_token_manager(mut self, manager: Arc<TokenManager>) -> Self {
        self.token_manager = Some(manager);
        self
    }

    /// Replace the observability hooks
    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<dyn RequestHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Token manager, if configured
    #[must_use]
    pub fn token_manager(&self) -> Option<&Arc<TokenManager>> {
        self.token_manager.as_ref()
    }

    /// Response cache
    #[must_use]
    pub const fn cache(&self) -> &Arc<ResponseCache<Value>> {
        &self.cache
    }

    /// Deduplicator
    #[must_use]
    pub const fn deduplicator(&self) -> &Arc<Deduplicator<Value>> {
        &self.dedup
    }

    /// Cache counters
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Deduplication counters
    #[must_use]
    pub fn dedup_stats(&self) -> DedupStats {
        self.dedup.stats()
    }

    /// GET `path` and decode the response
    ///
    /// # Errors
    ///
    /// Returns the error produced by whichever stage failed, unwrapped
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        options: RequestOptions,
    ) -> ClientResult<T> {
        let value = self
            .request(HttpMethod::Get, path, query, None, options)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// POST a JSON body to `path`
    ///
    /// # Errors
    ///
    /// See [`RequestPipeline::get`]
    pub async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> ClientResult<T> {
        let body = serde_json::to_value(body)?;
        let value = self
            .request(HttpMethod::Post, path, &[], Some(body), options)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// PUT a JSON body to `path`
    ///
    /// # Errors
    ///
    /// See [`RequestPipeline::get`]
    pub async fn put<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> ClientResult<T> {
        let body = serde_json::to_value(body)?;
        let value = self
            .request(HttpMethod::Put, path, &[], Some(body), options)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// DELETE `path`
    ///
    /// # Errors
    ///
    /// See [`RequestPipeline::get`]
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ClientResult<T> {
        let value = self
            .request(HttpMethod::Delete, path, &[], None, options)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Absolute URL for `path` with `query` appended
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the result is not a valid URL
    pub fn build_url(&self, path: &str, query: &[(&str, String)]) -> ClientResult<Url> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut url = Url::parse(&joined)
            .map_err(|e| ClientError::config(format!("Invalid request URL {joined}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Run one request through every pipeline stage
    ///
    /// # Errors
    ///
    /// See [`RequestPipeline::get`]
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
        options: RequestOptions,
    ) -> ClientResult<Value> {
        let url = self.build_url(path, query)?;
        let body_text = body.as_ref().map(Value::to_string).unwrap_or_default();
        let key = request_key(method, url.as_str(), &body_text);

        let request_id = Uuid::new_v4();
        let started = Instant::now();
        self.hooks.on_request_start(&RequestStart {
            request_id,
            method,
            url: url.to_string(),
        });

        let use_cache = method == HttpMethod::Get && !options.skip_cache;
        if use_cache {
            if let Some(hit) = self.cache.get(&key).await {
                self.hooks.on_cache_hit(&key);
                self.finish(RequestSummary {
                    request_id,
                    method,
                    url: url.to_string(),
                    duration: started.elapsed(),
                    cache_status: CacheStatus::Hit,
                    retries: 0,
                    success: true,
                });
                return Ok(hit);
            }
        }

        let timeout = options.timeout.unwrap_or(self.default_timeout);
        let attempts = Arc::new(AtomicU32::new(0));
        let mut headers = self.default_headers.clone();
        headers.extend(options.headers.iter().cloned());
        let execution = Execution {
            transport: Arc::clone(&self.transport),
            token_manager: self.token_manager.clone(),
            method,
            url: url.clone(),
            body,
            headers,
            retry: options
                .max_retries
                .map_or_else(|| self.retry.clone(), |n| self.retry.with_max_attempts(n)),
            timeout,
            cancel: options.cancel.clone(),
            attempts: Arc::clone(&attempts),
        };

        let shared = self.dedup.execute_with(
            &key,
            ExecuteOptions {
                bypass: options.skip_dedup,
            },
            move || execution.run(),
        );
        // A follower's token only detaches that caller; the leader's also aborts the leg
        let result = match options.cancel.as_ref() {
            Some(cancel) => tokio::select! {
                biased;
                () = cancel.cancelled() => Err(ClientError::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                }),
                result = shared => result,
            },
            None => shared.await,
        };

        if use_cache {
            if let Ok(value) = &result {
                self.cache.set(key, value.clone(), options.cache_ttl).await;
            }
        }

        self.finish(RequestSummary {
            request_id,
            method,
            url: url.to_string(),
            duration: started.elapsed(),
            cache_status: if use_cache {
                CacheStatus::Miss
            } else {
                CacheStatus::Bypass
            },
            retries: attempts.load(Ordering::Relaxed).saturating_sub(1),
            success: result.is_ok(),
        });

        result
    }

    fn finish(&self, summary: RequestSummary) {
        if summary.duration > self.slow_request_threshold {
            self.hooks.on_slow_request(&summary);
        }
        self.hooks.on_request_end(&summary);
    }
}
