// ABOUTME: Streaming iteration over paginated WHOOP collections
// ABOUTME: Fetches pages lazily by following next_token until exhausted or capped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Streaming Collections
//!
//! Collection endpoints return at most 25 records per page. Streams hold one page
//! in a buffer and request the next page only when the buffer is drained, so memory
//! stays bounded no matter how long the history is.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;

use async_stream::try_stream;
use futures_util::Stream;
use whoop_core::constants::api::MAX_PAGE_LIMIT;
use whoop_core::models::Paginated;
use whoop_core::ClientError;

use super::params::CollectionParams;

/// Stream of records yielded one at a time
pub type RecordStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T, ClientError>> + Send + 'a>>;

/// Configuration for collection streaming
#[derive(Debug, Clone, Copy)]
pub struct StreamConfig {
    /// Records requested per page, clamped to 1..=25
    pub page_size: u32,
    /// Stop after this many records (None for unlimited)
    pub max_records: Option<usize>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_LIMIT,
            max_records: None,
        }
    }
}

impl StreamConfig {
    /// Create configuration with specified page size
    #[must_use]
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            page_size: page_size.clamp(1, MAX_PAGE_LIMIT),
            max_records: None,
        }
    }

    /// Set maximum number of records to yield
    #[must_use]
    pub const fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = Some(max);
        self
    }
}

/// Stream every record reachable from `params` using `fetch_page`
///
/// `params.limit` and `params.next_token` are replaced by the stream; the time range
/// is kept for every page.
pub fn paginate<'a, T, F, Fut>(
    params: CollectionParams,
    config: StreamConfig,
    fetch_page: F,
) -> RecordStream<'a, T>
where
    T: Send + 'a,
    F: Fn(CollectionParams) -> Fut + Send + 'a,
    Fut: Future<Output = Result<Paginated<T>, ClientError>> + Send + 'a,
{
    let page_size = config.page_size.clamp(1, MAX_PAGE_LIMIT);
    let max_records = config.max_records;

    Box::pin(try_stream! {
        let mut buffer: VecDeque<T> = VecDeque::new();
        let mut next_token: Option<String> = None;
        let mut yielded: usize = 0;
        let mut exhausted = false;

        loop {
            if max_records.is_some_and(|max| yielded >= max) {
                break;
            }

            if let Some(record) = buffer.pop_front() {
                yielded += 1;
                yield record;
                continue;
            }

            if exhausted {
                break;
            }

            let page_params = CollectionParams {
                limit: Some(page_size),
                next_token: next_token.take(),
                ..params.clone()
            };
            let page = fetch_page(page_params).await?;

            // An empty page with a token would loop forever
            exhausted = page.next_token.is_none() || page.records.is_empty();
            next_token = page.next_token;
            buffer.extend(page.records);
        }
    })
}
