// ABOUTME: Main library entry point for the typed WHOOP API client
// ABOUTME: Request pipeline with caching, deduplication, retries and OAuth token lifecycle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # WHOOP Client
//!
//! A typed client for the WHOOP developer API. Endpoint methods map to fixed paths
//! (profile, body measurement, cycles, recovery, sleep, workouts) and every call runs
//! through one request pipeline.
//!
//! ## Architecture
//!
//! - **Cache**: bounded LRU store with per-entry TTL and optional compression
//! - **Deduplication**: concurrent identical requests share one execution
//! - **Retry**: exponential backoff with jitter, driven by error classification
//! - **`OAuth2`**: token storage with proactive, single-flight refresh
//! - **Pipeline**: cache, dedup, bearer token and retry around one HTTP call
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use whoop_client::{ClientConfig, WhoopClient};
//! use whoop_client::oauth2_client::OAuth2Config;
//! use whoop_client::api::CollectionParams;
//!
//! #[tokio::main]
//! async fn main() -> whoop_client::ClientResult<()> {
//!     let config = ClientConfig::from_env();
//!     let client = WhoopClient::with_oauth(&config, OAuth2Config::from_env()?)?;
//!     client.authenticate_with_code("code-from-redirect").await?;
//!
//!     let cycles = client.get_cycles(&CollectionParams::default().with_limit(5)).await?;
//!     for cycle in cycles.records {
//!         println!("cycle {} strain {:?}", cycle.id, cycle.score.map(|s| s.strain));
//!     }
//!     Ok(())
//! }
//! ```

/// Endpoint methods, parameters and streams
pub mod api;

/// Response cache
pub mod cache;

/// Client configuration
pub mod config;

/// Single-flight request deduplication
pub mod dedup;

/// Transport, hooks and request pipeline
pub mod http_client;

/// Tracing subscriber setup
pub mod logging;

/// OAuth token endpoint client and token manager
pub mod oauth2_client;

/// Retry with exponential backoff
pub mod retry;

pub use api::WhoopClient;
pub use config::ClientConfig;
pub use whoop_core::models;
pub use whoop_core::{AuthOrigin, ClientError, ClientResult, ErrorCode};
