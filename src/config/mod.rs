// ABOUTME: Configuration management for the WHOOP client
// ABOUTME: Re-exports the top-level client configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Client and pipeline settings
pub mod client;

pub use client::ClientConfig;
