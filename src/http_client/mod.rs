// ABOUTME: HTTP layer of the client: transport seam, request pipeline and hooks
// ABOUTME: Derives the deterministic key shared by the cache and the deduplicator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Observability hooks
pub mod hooks;
/// Cache, dedup, token and retry composition
pub mod pipeline;
/// Transport trait and reqwest implementation
pub mod transport;

pub use hooks::{CacheStatus, NoopHooks, RequestHooks, RequestStart, RequestSummary, TracingHooks};
pub use pipeline::{RequestOptions, RequestPipeline};
pub use transport::{
    HttpMethod, HttpTransport, ReqwestTransport, TransportError, TransportRequest,
    TransportResponse,
};

use xxhash_rust::xxh3::xxh3_64;

/// Cache and dedup key for a request
///
/// The method prefix keeps keys readable in logs; the hash covers method, URL and
/// body so equal requests always collide and different ones practically never do.
#[must_use]
pub fn request_key(method: HttpMethod, url: &str, body: &str) -> String {
    let material = format!("{method}\n{url}\n{body}");
    format!("{method}:{:016x}", xxh3_64(material.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_key_is_deterministic() {
        let a = request_key(HttpMethod::Get, "https://x/v2/cycle?limit=5", "");
        let b = request_key(HttpMethod::Get, "https://x/v2/cycle?limit=5", "");
        assert_eq!(a, b);
        assert!(a.starts_with("GET:"));
    }

    #[test]
    fn test_request_key_separates_inputs() {
        let base = request_key(HttpMethod::Get, "https://x/v2/cycle", "");
        assert_ne!(base, request_key(HttpMethod::Post, "https://x/v2/cycle", ""));
        assert_ne!(base, request_key(HttpMethod::Get, "https://x/v2/cycle?limit=1", ""));
        assert_ne!(
            request_key(HttpMethod::Post, "https://x/v2/cycle", "{\"a\":1}"),
            request_key(HttpMethod::Post, "https://x/v2/cycle", "{\"a\":2}")
        );
    }
}
