// ABOUTME: Query parameters for WHOOP collection endpoints with local validation
// ABOUTME: Rejects out-of-range limits, inverted time ranges and malformed record ids
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;
use whoop_core::constants::api::MAX_PAGE_LIMIT;
use whoop_core::{ClientError, ClientResult};

/// Filters and paging for collection endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionParams {
    /// Page size, 1 to 25
    pub limit: Option<u32>,
    /// Only records starting at or after this instant
    pub start: Option<DateTime<Utc>>,
    /// Only records starting before this instant
    pub end: Option<DateTime<Utc>>,
    /// Continuation token from a previous page
    pub next_token: Option<String>,
}

impl CollectionParams {
    /// Parameters with a page size
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Parameters restricted to `[start, end)`
    #[must_use]
    pub fn with_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Parameters continuing from a previous page
    #[must_use]
    pub fn with_next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }

    /// Check the parameters before a request is made
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field
    pub fn validate(&self) -> ClientResult<()> {
        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_PAGE_LIMIT {
                return Err(ClientError::validation(
                    "limit",
                    format!("limit must be between 1 and {MAX_PAGE_LIMIT}, got {limit}"),
                ));
            }
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start >= end {
                return Err(ClientError::validation(
                    "start",
                    format!("start {start} must be before end {end}"),
                ));
            }
        }
        if self.next_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ClientError::validation(
                "next_token",
                "next_token must not be empty",
            ));
        }
        Ok(())
    }

    /// Validated query pairs in WHOOP's parameter names
    ///
    /// # Errors
    ///
    /// See [`CollectionParams::validate`]
    pub fn to_query(&self) -> ClientResult<Vec<(&'static str, String)>> {
        self.validate()?;
        let mut query = Vec::with_capacity(4);
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(start) = self.start {
            query.push(("start", start.to_rfc3339_opts(SecondsFormat::Millis, true)));
        }
        if let Some(end) = self.end {
            query.push(("end", end.to_rfc3339_opts(SecondsFormat::Millis, true)));
        }
        if let Some(token) = &self.next_token {
            query.push(("nextToken", token.clone()));
        }
        Ok(query)
    }
}

/// Cycle ids are positive integers
pub(crate) fn validate_cycle_id(id: i64) -> ClientResult<()> {
    if id <= 0 {
        return Err(ClientError::validation(
            "cycle_id",
            format!("cycle id must be positive, got {id}"),
        ));
    }
    Ok(())
}

/// Sleep and workout ids are UUIDs
pub(crate) fn validate_activity_id(field: &str, id: &str) -> ClientResult<()> {
    Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| ClientError::validation(field, format!("{field} must be a UUID, got {id:?}")))
}
