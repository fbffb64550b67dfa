// ABOUTME: Tests for single-flight request deduplication
// ABOUTME: Covers collapsing, the dedup window, cancellation, the concurrency ceiling and batching
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures_util::future::{join_all, BoxFuture, FutureExt};
use whoop_client::dedup::{DedupConfig, Deduplicator, ExecuteOptions};
use whoop_client::{ClientError, ClientResult};

fn dedup<T>() -> Arc<Deduplicator<T>>
where
    T: Clone + Send + Sync + 'static,
{
    Arc::new(Deduplicator::new(DedupConfig::default()))
}

/// Work that counts its invocations, sleeps, then yields `value`
fn counted_work(
    calls: &Arc<AtomicUsize>,
    delay: Duration,
    value: u32,
) -> impl FnOnce() -> BoxFuture<'static, ClientResult<u32>> + Send + 'static {
    let calls = Arc::clone(calls);
    move || -> BoxFuture<'static, ClientResult<u32>> {
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            Ok(value)
        }
        .boxed()
    }
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_share_one_execution() -> Result<()> {
    let dedup = dedup::<u32>();
    let calls = Arc::new(AtomicUsize::new(0));

    let results = join_all((0..10).map(|_| {
        dedup.execute("GET:/v2/cycle", counted_work(&calls, Duration::from_millis(20), 42))
    }))
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(results.iter().all(|r| r == &Ok(42)));

    let stats = dedup.stats();
    assert_eq!(stats.total_requests, 10);
    assert_eq!(stats.deduped_requests, 9);
    assert!((stats.savings_percent - 90.0).abs() < 1e-9);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_distinct_keys_run_independently() -> Result<()> {
    let dedup = dedup::<u32>();
    let calls = Arc::new(AtomicUsize::new(0));

    let (a, b) = tokio::join!(
        dedup.execute("a", counted_work(&calls, Duration::from_millis(10), 1)),
        dedup.execute("b", counted_work(&calls, Duration::from_millis(10), 2)),
    );

    assert_eq!(a, Ok(1));
    assert_eq!(b, Ok(2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_caller_within_window_reuses_settled_outcome() -> Result<()> {
    let dedup = dedup::<u32>();
    let calls = Arc::new(AtomicUsize::new(0));

    let first = {
        let dedup = Arc::clone(&dedup);
        let work = counted_work(&calls, Duration::from_millis(10), 7);
        tokio::spawn(async move { dedup.execute("k", work).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = dedup
        .execute("k", counted_work(&calls, Duration::from_millis(10), 8))
        .await;

    assert_eq!(first.await?, Ok(7));
    assert_eq!(second, Ok(7));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_caller_after_window_starts_new_execution() -> Result<()> {
    let dedup = dedup::<u32>();
    let calls = Arc::new(AtomicUsize::new(0));

    let first = dedup
        .execute("k", counted_work(&calls, Duration::from_millis(10), 1))
        .await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(!dedup.is_pending("k"));

    let second = dedup
        .execute("k", counted_work(&calls, Duration::from_millis(10), 2))
        .await;

    assert_eq!(first, Ok(1));
    assert_eq!(second, Ok(2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_failure_is_shared_with_every_caller() -> Result<()> {
    let dedup = dedup::<u32>();
    let calls = Arc::new(AtomicUsize::new(0));

    let results = join_all((0..3).map(|_| {
        let calls = Arc::clone(&calls);
        dedup.execute("k", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            Err::<u32, _>(ClientError::from_status(503, "down", "/v2/cycle", None))
        })
    }))
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    for result in results {
        assert!(matches!(result, Err(ClientError::Api { status: 503, .. })));
    }
    Ok(())
}

#[tokio::test]
async fn test_panicking_work_becomes_internal_error() -> Result<()> {
    let dedup = dedup::<u32>();

    let result = dedup
        .execute("k", || async {
            if true {
                panic!("boom");
            }
            Ok(1)
        })
        .await;

    match result {
        Err(ClientError::Internal { message }) => assert!(message.contains("boom")),
        other => panic!("expected internal error, got {other:?}"),
    }

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(!dedup.is_pending("k"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_cancel_rejects_attached_callers() -> Result<()> {
    let dedup = dedup::<u32>();
    let calls = Arc::new(AtomicUsize::new(0));

    let waiters: Vec<_> = (0..2)
        .map(|_| {
            let dedup = Arc::clone(&dedup);
            let work = counted_work(&calls, Duration::from_secs(10), 1);
            tokio::spawn(async move { dedup.execute("k", work).await })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(dedup.is_pending("k"));
    assert!(dedup.cancel("k"));
    assert!(!dedup.is_pending("k"));
    assert!(!dedup.cancel("k"));

    for waiter in waiters {
        assert!(matches!(waiter.await?, Err(ClientError::Cancelled { key }) if key == "k"));
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_clear_cancels_everything() -> Result<()> {
    let dedup = dedup::<u32>();
    let calls = Arc::new(AtomicUsize::new(0));

    let a = {
        let dedup = Arc::clone(&dedup);
        let work = counted_work(&calls, Duration::from_secs(10), 1);
        tokio::spawn(async move { dedup.execute("a", work).await })
    };
    let b = {
        let dedup = Arc::clone(&dedup);
        let work = counted_work(&calls, Duration::from_secs(10), 2);
        tokio::spawn(async move { dedup.execute("b", work).await })
    };

    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(dedup.stats().pending, 2);
    dedup.clear();

    assert!(matches!(a.await?, Err(ClientError::Cancelled { .. })));
    assert!(matches!(b.await?, Err(ClientError::Cancelled { .. })));
    assert_eq!(dedup.stats().pending, 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_ceiling_is_respected() -> Result<()> {
    let dedup: Arc<Deduplicator<usize>> = Arc::new(Deduplicator::new(DedupConfig {
        max_concurrent: 2,
        ..DedupConfig::default()
    }));
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let dedup = &dedup;
    let results = join_all((0..5).map(|i| {
        let running = Arc::clone(&running);
        let peak = Arc::clone(&peak);
        let key = format!("key-{i}");
        async move {
            dedup
                .execute(&key, move || async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(i)
                })
                .await
        }
    }))
    .await;

    assert_eq!(results, (0..5).map(Ok).collect::<Vec<ClientResult<usize>>>());
    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(dedup.stats().max_concurrency, 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_disabled_and_bypass_run_every_call() -> Result<()> {
    let disabled: Deduplicator<u32> = Deduplicator::new(DedupConfig {
        enabled: false,
        ..DedupConfig::default()
    });
    let calls = Arc::new(AtomicUsize::new(0));

    join_all((0..3).map(|_| {
        disabled.execute("k", counted_work(&calls, Duration::from_millis(10), 1))
    }))
    .await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(disabled.stats().total_requests, 0);

    let enabled = dedup::<u32>();
    let bypass_calls = Arc::new(AtomicUsize::new(0));
    join_all((0..3).map(|_| {
        enabled.execute_with(
            "k",
            ExecuteOptions { bypass: true },
            counted_work(&bypass_calls, Duration::from_millis(10), 1),
        )
    }))
    .await;
    assert_eq!(bypass_calls.load(Ordering::SeqCst), 3);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_batch_fans_results_back_in_order() -> Result<()> {
    let dedup: Deduplicator<u32, u32> = Deduplicator::new(DedupConfig::default());
    let handler_calls = AtomicUsize::new(0);
    let handler = |items: Vec<u32>| {
        handler_calls.fetch_add(1, Ordering::SeqCst);
        async move { Ok(items.into_iter().map(|n| n * 2).collect()) }
    };

    let (a, b, c) = tokio::join!(
        dedup.batch("recoveries", 1, handler),
        dedup.batch("recoveries", 2, handler),
        dedup.batch("recoveries", 3, handler),
    );

    assert_eq!((a, b, c), (Ok(2), Ok(4), Ok(6)));
    assert_eq!(handler_calls.load(Ordering::SeqCst), 1);
    assert_eq!(dedup.stats().queued_batches, 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_batch_result_count_mismatch_fails_every_item() -> Result<()> {
    let dedup: Deduplicator<u32, u32> = Deduplicator::new(DedupConfig::default());
    let handler = |_items: Vec<u32>| async { Ok(vec![1]) };

    let (a, b) = tokio::join!(
        dedup.batch("sleeps", 1, handler),
        dedup.batch("sleeps", 2, handler),
    );

    assert!(matches!(a, Err(ClientError::Internal { .. })));
    assert!(matches!(b, Err(ClientError::Internal { .. })));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_dropped_batch_opener_releases_its_queue() -> Result<()> {
    let dedup: Deduplicator<u32, u32> = Deduplicator::new(DedupConfig {
        batch_window: Duration::from_millis(50),
        ..DedupConfig::default()
    });
    let handler = |items: Vec<u32>| async move { Ok(items) };

    let (opener, joined) = tokio::join!(
        tokio::time::timeout(
            Duration::from_millis(10),
            dedup.batch("workouts", 1, handler)
        ),
        dedup.batch("workouts", 2, handler),
    );

    assert!(opener.is_err(), "opener gave up before the window closed");
    assert!(matches!(joined, Err(ClientError::Cancelled { .. })));
    assert_eq!(dedup.stats().queued_batches, 0);

    let later = tokio::time::timeout(
        Duration::from_secs(2),
        dedup.batch("workouts", 3, handler),
    )
    .await?;
    assert_eq!(later, Ok(3));
    Ok(())
}
