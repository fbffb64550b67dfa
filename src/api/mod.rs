// ABOUTME: Endpoint layer of the WHOOP client built on the request pipeline
// ABOUTME: Typed endpoint methods, collection parameters, streams and unit helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Typed endpoint methods
pub mod client;
/// Collection query parameters
pub mod params;
/// Paginated streaming
pub mod stream;
/// Unit conversions
pub mod units;

pub use client::WhoopClient;
pub use params::CollectionParams;
pub use stream::{paginate, RecordStream, StreamConfig};
