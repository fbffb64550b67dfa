// ABOUTME: Gzip compression for cached payloads above a size threshold
// ABOUTME: Compressed output is kept only when it saves enough space
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use whoop_core::constants::cache::COMPRESSION_MAX_RATIO;

/// Compress `bytes` if the result is less than 80% of the original size
///
/// Returns `None` when compression fails or does not pay off.
#[must_use]
pub fn compress_if_smaller(bytes: &[u8]) -> Option<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    if encoder.write_all(bytes).is_err() {
        return None;
    }
    let compressed = encoder.finish().ok()?;

    let limit = bytes.len() as f64 * COMPRESSION_MAX_RATIO;
    ((compressed.len() as f64) < limit).then_some(compressed)
}

/// Inflate a payload produced by [`compress_if_smaller`]
#[must_use]
pub fn decompress(bytes: &[u8]) -> Option<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).ok()?;
    Some(out)
}
