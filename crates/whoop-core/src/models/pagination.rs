// ABOUTME: Paginated collection envelope returned by WHOOP list endpoints
// ABOUTME: Pages are chained through an opaque next_token
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// One page of a WHOOP collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Records in this page
    pub records: Vec<T>,
    /// Token for fetching the next page (None if no more pages)
    #[serde(default)]
    pub next_token: Option<String>,
}

impl<T> Paginated<T> {
    /// Whether another page is available
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.next_token.is_some()
    }
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            next_token: None,
        }
    }
}
