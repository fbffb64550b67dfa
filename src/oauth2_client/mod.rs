// ABOUTME: OAuth 2.0 client and token lifecycle management for the WHOOP API
// ABOUTME: Code exchange, refresh-token exchange, and single-flight token refresh
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # OAuth 2.0 Client Module
//!
//! The client acts as an OAuth 2.0 client of the WHOOP authorization server:
//! - Authorization-code and refresh-token exchanges against the token endpoint
//! - Proactive refresh of access tokens inside a safety buffer
//! - Coalescing of concurrent refreshes into one exchange

/// Token endpoint client
pub mod client;
/// Token storage and refresh coordination
pub mod token_manager;

pub use client::{OAuth2Client, OAuth2Config, TokenRefresher};
pub use token_manager::TokenManager;
