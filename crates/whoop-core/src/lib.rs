// ABOUTME: Core types and constants for the WHOOP API client
// ABOUTME: Foundation crate with error taxonomy, constants, and resource models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # WHOOP Core
//!
//! Foundation crate providing shared types and constants for the WHOOP client.
//! This crate is designed to change infrequently, enabling incremental compilation
//! benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: `ClientError` taxonomy with retry classification
//! - **constants**: Defaults organized by domain
//! - **models**: Profile, cycle, recovery, sleep, workout and OAuth token types

/// Error taxonomy shared by every layer of the client
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// WHOOP resource models and OAuth token types
pub mod models;

pub use errors::{AuthOrigin, ClientError, ClientResult, ErrorCode};
