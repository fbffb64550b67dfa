// ABOUTME: Single-flight request deduplication with a concurrency ceiling and batching
// ABOUTME: Concurrent callers sharing a key observe one execution and its exact outcome
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Request Deduplication
//!
//! [`Deduplicator::execute`] collapses concurrent calls that share a key into one
//! execution of `work`. The first caller registers a pending entry and spawns the
//! work onto the runtime; callers arriving within the dedup window attach to the
//! same shared outcome instead of starting their own.
//!
//! The spawned task owns the pending entry's lifecycle, so the entry is released
//! even if every caller stops awaiting it. A settled outcome stays attachable until
//! the window measured from its start elapses, then the entry is dropped.
//!
//! Distinct in-flight keys never exceed `max_concurrent`. Callers waiting for a slot
//! re-check on a short fixed interval and attach to a matching entry if one appears
//! while they wait.

use std::collections::HashMap;
use std::env;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinError;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use whoop_core::constants::dedup::{
    DEFAULT_BATCH_WINDOW_MS, DEFAULT_DEDUP_WINDOW_MS, DEFAULT_MAX_CONCURRENT,
    SLOT_POLL_INTERVAL_MS,
};
use whoop_core::{ClientError, ClientResult};

/// Deduplicator configuration
#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// Master switch; when off every call runs its own work
    pub enabled: bool,
    /// Calls arriving within this long after an execution started share its outcome
    pub window: Duration,
    /// Ceiling on distinct keys executing at once
    pub max_concurrent: usize,
    /// How long a batch queue collects items before its handler runs
    pub batch_window: Duration,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window: Duration::from_millis(DEFAULT_DEDUP_WINDOW_MS),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            batch_window: Duration::from_millis(DEFAULT_BATCH_WINDOW_MS),
        }
    }
}

impl DedupConfig {
    /// Load deduplication settings from environment
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env::var("WHOOP_DEDUP_ENABLED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.enabled),
            window: env::var("WHOOP_DEDUP_WINDOW_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.window, Duration::from_millis),
            max_concurrent: env::var("WHOOP_DEDUP_MAX_CONCURRENT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_concurrent),
            ..defaults
        }
    }
}

/// Per-call options for [`Deduplicator::execute_with`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteOptions {
    /// Run `work` directly, skipping the pending map and the ceiling
    pub bypass: bool,
}

/// Point-in-time deduplication statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DedupStats {
    /// Calls to `execute` that went through deduplication
    pub total_requests: u64,
    /// Calls that attached to an existing execution
    pub deduped_requests: u64,
    /// Highest number of keys observed executing at once
    pub max_concurrency: usize,
    /// Keys currently executing
    pub pending: usize,
    /// Batch families currently collecting items
    pub queued_batches: usize,
    /// `deduped_requests / total_requests` as a percentage
    pub savings_percent: f64,
}

type SharedOutcome<T> = Shared<BoxFuture<'static, ClientResult<T>>>;

struct PendingRequest<T> {
    generation: u64,
    started_at: Instant,
    outcome: SharedOutcome<T>,
    cancel: CancellationToken,
    settled: bool,
}

struct BatchQueue<T, I> {
    generation: u64,
    items: Vec<(I, oneshot::Sender<ClientResult<T>>)>,
}

struct DedupState<T, I> {
    pending: HashMap<String, PendingRequest<T>>,
    batches: HashMap<String, BatchQueue<T, I>>,
    next_generation: u64,
    total_requests: u64,
    deduped_requests: u64,
    max_concurrency: usize,
}

impl<T, I> DedupState<T, I> {
    fn new() -> Self {
        Self {
            pending: HashMap::new(),
            batches: HashMap::new(),
            next_generation: 0,
            total_requests: 0,
            deduped_requests: 0,
            max_concurrency: 0,
        }
    }

    fn in_flight(&self) -> usize {
        self.pending.values().filter(|p| !p.settled).count()
    }

    fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn remove_if_current(&mut self, key: &str, generation: u64) {
        if self
            .pending
            .get(key)
            .is_some_and(|p| p.generation == generation)
        {
            self.pending.remove(key);
        }
    }
}

type StateRef<T, I> = Arc<Mutex<DedupState<T, I>>>;

fn lock_state<T, I>(state: &Mutex<DedupState<T, I>>) -> MutexGuard<'_, DedupState<T, I>> {
    state.lock().unwrap_or_else(|poisoned| {
        warn!("Deduplicator lock poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Single-flight executor keyed by request key
///
/// `T` is the outcome type shared between callers. `I` is the item type accepted by
/// [`Deduplicator::batch`].
pub struct Deduplicator<T, I = String> {
    config: DedupConfig,
    state: StateRef<T, I>,
}

impl<T, I> Deduplicator<T, I>
where
    T: Clone + Send + Sync + 'static,
    I: Send + 'static,
{
    /// Create a deduplicator
    #[must_use]
    pub fn new(config: DedupConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(DedupState::new())),
        }
    }

    /// Configuration the deduplicator was built with
    #[must_use]
    pub const fn config(&self) -> &DedupConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, DedupState<T, I>> {
        lock_state(&self.state)
    }

    /// Run `work` under `key`, sharing the outcome with concurrent callers
    ///
    /// # Errors
    ///
    /// Returns whatever `work` produced, [`ClientError::Cancelled`] if the entry was
    /// cancelled, or [`ClientError::Internal`] if `work` panicked.
    pub async fn execute<F, Fut>(&self, key: &str, work: F) -> ClientResult<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        self.execute_with(key, ExecuteOptions::default(), work)
            .await
    }

    /// [`Deduplicator::execute`] with per-call options
    ///
    /// # Errors
    ///
    /// See [`Deduplicator::execute`].
    pub async fn execute_with<F, Fut>(
        &self,
        key: &str,
        options: ExecuteOptions,
        work: F,
    ) -> ClientResult<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        if !self.config.enabled || options.bypass {
            return work().await;
        }

        self.lock().total_requests += 1;

        let outcome = loop {
            {
                let mut state = self.lock();
                if let Some(existing) = self.attachable(&state, key) {
                    state.deduped_requests += 1;
                    debug!(key = %key, "Attached to in-flight request");
                    break existing;
                }
                if state.in_flight() < self.config.max_concurrent.max(1) {
                    break self.register(&mut state, key, work);
                }
            }
            sleep(Duration::from_millis(SLOT_POLL_INTERVAL_MS)).await;
        };

        outcome.await
    }

    fn attachable(&self, state: &DedupState<T, I>, key: &str) -> Option<SharedOutcome<T>> {
        state
            .pending
            .get(key)
            .filter(|p| p.started_at.elapsed() <= self.config.window)
            .map(|p| p.outcome.clone())
    }

    fn register<F, Fut>(
        &self,
        state: &mut DedupState<T, I>,
        key: &str,
        work: F,
    ) -> SharedOutcome<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let generation = state.next_generation();
        let cancel = CancellationToken::new();
        let started_at = Instant::now();

        let handle = tokio::spawn(run_work(
            Arc::clone(&self.state),
            key.to_owned(),
            generation,
            cancel.clone(),
            started_at + self.config.window,
            work,
        ));

        let owned_key = key.to_owned();
        let task_state = Arc::clone(&self.state);
        let outcome = async move {
            handle.await.unwrap_or_else(|join_error| {
                lock_state(&task_state).remove_if_current(&owned_key, generation);
                Err(join_failure(&owned_key, join_error))
            })
        }
        .boxed()
        .shared();

        // Replaces an entry whose window has passed; its task only releases its own generation
        state.pending.insert(
            key.to_owned(),
            PendingRequest {
                generation,
                started_at,
                outcome: outcome.clone(),
                cancel,
                settled: false,
            },
        );
        state.max_concurrency = state.max_concurrency.max(state.in_flight());
        debug!(key = %key, generation, "Started deduplicated request");

        outcome
    }

    /// Cancel the execution pending under `key`
    ///
    /// Attached callers observe [`ClientError::Cancelled`]. Returns whether an
    /// execution was still running.
    pub fn cancel(&self, key: &str) -> bool {
        let removed = self.lock().pending.remove(key);
        removed.is_some_and(|pending| {
            pending.cancel.cancel();
            debug!(key = %key, "Cancelled deduplicated request");
            !pending.settled
        })
    }

    /// Whether `key` currently has an attachable or running entry
    #[must_use]
    pub fn is_pending(&self, key: &str) -> bool {
        self.lock().pending.contains_key(key)
    }

    /// Cancel every pending execution and drop every batch queue
    pub fn clear(&self) {
        let mut state = self.lock();
        for (_, pending) in state.pending.drain() {
            pending.cancel.cancel();
        }
        state.batches.clear();
    }

    /// Snapshot of deduplication counters
    #[must_use]
    pub fn stats(&self) -> DedupStats {
        let state = self.lock();
        let savings_percent = if state.total_requests == 0 {
            0.0
        } else {
            state.deduped_requests as f64 / state.total_requests as f64 * 100.0
        };
        DedupStats {
            total_requests: state.total_requests,
            deduped_requests: state.deduped_requests,
            max_concurrency: state.max_concurrency,
            pending: state.in_flight(),
            queued_batches: state.batches.len(),
            savings_percent,
        }
    }

    /// Queue `item` into the batch for `family` and await its individual result
    ///
    /// The first call for a family opens the queue, waits `batch_window`, then calls
    /// `handler` once with every item submitted meanwhile. Result `i` goes to the
    /// submitter of item `i`; later callers' `handler` is never invoked.
    ///
    /// # Errors
    ///
    /// Every submitter receives the handler's error, an internal error if the handler
    /// returns the wrong number of results, or [`ClientError::Cancelled`] if the queue
    /// was cleared or its opener was dropped before flushing.
    pub async fn batch<F, Fut>(&self, family: &str, item: I, handler: F) -> ClientResult<T>
    where
        F: FnOnce(Vec<I>) -> Fut,
        Fut: Future<Output = ClientResult<Vec<T>>>,
    {
        let (tx, rx) = oneshot::channel();

        let opened = {
            let mut state = self.lock();
            if let Some(queue) = state.batches.get_mut(family) {
                queue.items.push((item, tx));
                None
            } else {
                let generation = state.next_generation();
                state.batches.insert(
                    family.to_owned(),
                    BatchQueue {
                        generation,
                        items: vec![(item, tx)],
                    },
                );
                Some(generation)
            }
        };

        if let Some(generation) = opened {
            let mut opener = BatchOpener {
                state: self.state.as_ref(),
                family,
                generation,
                armed: true,
            };
            sleep(self.config.batch_window).await;
            if let Some(items) = opener.take_items() {
                flush_batch(family, items, handler).await;
            }
        }

        rx.await.unwrap_or_else(|_| {
            Err(ClientError::Cancelled {
                key: family.to_owned(),
            })
        })
    }
}

type BatchItems<T, I> = Vec<(I, oneshot::Sender<ClientResult<T>>)>;

fn take_queue<T, I>(
    state: &mut DedupState<T, I>,
    family: &str,
    generation: u64,
) -> Option<BatchItems<T, I>> {
    if state
        .batches
        .get(family)
        .is_some_and(|q| q.generation == generation)
    {
        state.batches.remove(family).map(|q| q.items)
    } else {
        None
    }
}

/// Owns a batch queue until its opener flushes it
///
/// If the opener's future is dropped first, the queue is removed and its
/// submitters observe [`ClientError::Cancelled`] instead of waiting forever.
struct BatchOpener<'a, T, I> {
    state: &'a Mutex<DedupState<T, I>>,
    family: &'a str,
    generation: u64,
    armed: bool,
}

impl<T, I> BatchOpener<'_, T, I> {
    fn take_items(&mut self) -> Option<BatchItems<T, I>> {
        self.armed = false;
        take_queue(&mut lock_state(self.state), self.family, self.generation)
    }
}

impl<T, I> Drop for BatchOpener<'_, T, I> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let discarded = take_queue(&mut lock_state(self.state), self.family, self.generation);
        if let Some(items) = discarded {
            debug!(
                family = %self.family,
                count = items.len(),
                "Batch opener dropped before flushing, queue discarded"
            );
        }
    }
}

async fn flush_batch<T, I, F, Fut>(
    family: &str,
    items: BatchItems<T, I>,
    handler: F,
) where
    T: Clone,
    F: FnOnce(Vec<I>) -> Fut,
    Fut: Future<Output = ClientResult<Vec<T>>>,
{
    let (inputs, senders): (Vec<I>, Vec<_>) = items.into_iter().unzip();
    let count = inputs.len();
    debug!(family = %family, count, "Flushing request batch");

    let failure = match handler(inputs).await {
        Ok(results) if results.len() == count => {
            for (sender, result) in senders.into_iter().zip(results) {
                // Submitter may have stopped waiting
                let _ = sender.send(Ok(result));
            }
            return;
        }
        Ok(results) => ClientError::internal(format!(
            "Batch handler for {family} returned {} results for {count} items",
            results.len()
        )),
        Err(error) => error,
    };

    for sender in senders {
        let _ = sender.send(Err(failure.clone()));
    }
}

async fn run_work<T, I, F, Fut>(
    state: StateRef<T, I>,
    key: String,
    generation: u64,
    cancel: CancellationToken,
    attachable_until: Instant,
    work: F,
) -> ClientResult<T>
where
    T: Send + Sync + 'static,
    I: Send + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    let result = tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ClientError::Cancelled { key: key.clone() }),
        result = work() => result,
    };

    let linger = {
        let mut guard = lock_state(&state);
        match guard.pending.get_mut(&key) {
            Some(pending) if pending.generation == generation => {
                pending.settled = true;
                attachable_until.saturating_duration_since(Instant::now())
            }
            _ => Duration::ZERO,
        }
    };

    if linger.is_zero() {
        lock_state(&state).remove_if_current(&key, generation);
    } else {
        tokio::spawn(async move {
            sleep(linger).await;
            lock_state(&state).remove_if_current(&key, generation);
        });
    }

    result
}

fn join_failure(key: &str, join_error: JoinError) -> ClientError {
    if join_error.is_panic() {
        let panic = join_error.into_panic();
        let detail = panic
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_owned());
        warn!(key = %key, "Deduplicated request panicked: {detail}");
        ClientError::internal(format!("Request work panicked: {detail}"))
    } else {
        ClientError::Cancelled {
            key: key.to_owned(),
        }
    }
}
