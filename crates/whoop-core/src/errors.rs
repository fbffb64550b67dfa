// ABOUTME: Unified error taxonomy for the WHOOP client with retry classification
// ABOUTME: Maps HTTP failures to typed errors and exposes retryability and delay hints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Client Error Handling
//!
//! Every layer of the client (cache, deduplicator, retry policy, pipeline, endpoint
//! wrappers) reports failures through [`ClientError`]. The layers never wrap one
//! another's errors, so callers always observe the variant that was produced at the
//! point of failure.
//!
//! The enum is `Clone` because a single outcome is fanned out to every caller
//! attached to a deduplicated request.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::retry::{NETWORK_RETRY_HINT_MS, RATE_LIMIT_DEFAULT_RETRY_SECS};

/// Result alias used across the client
pub type ClientResult<T> = Result<T, ClientError>;

/// Stable error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid,
    #[serde(rename = "AUTH_REQUIRED")]
    AuthRequired,
    #[serde(rename = "AUTH_INVALID")]
    AuthInvalid,
    #[serde(rename = "RATE_LIMIT_EXCEEDED")]
    RateLimitExceeded,
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput,
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound,
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError,
    #[serde(rename = "EXTERNAL_SERVICE_UNAVAILABLE")]
    ExternalServiceUnavailable,
    #[serde(rename = "NETWORK_ERROR")]
    NetworkError,
    #[serde(rename = "TIMEOUT")]
    Timeout,
    #[serde(rename = "CANCELLED")]
    Cancelled,
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError,
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::ConfigInvalid => "The client configuration is invalid",
            Self::AuthRequired => "Authentication is required before calling the API",
            Self::AuthInvalid => "The access token was rejected or could not be refreshed",
            Self::RateLimitExceeded => "The WHOOP API rate limit was exceeded",
            Self::InvalidInput => "The request parameters are invalid",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ExternalServiceError => "The WHOOP API rejected the request",
            Self::ExternalServiceUnavailable => "The WHOOP API is currently unavailable",
            Self::NetworkError => "The request could not reach the WHOOP API",
            Self::Timeout => "The request timed out or was aborted",
            Self::Cancelled => "The request was cancelled",
            Self::SerializationError => "Response data could not be decoded",
            Self::InternalError => "An internal client error occurred",
        }
    }
}

/// Where an authentication failure was detected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthOrigin {
    /// No usable credentials were held locally
    #[default]
    Client,
    /// The WHOOP API rejected the bearer token
    Api,
    /// The OAuth token endpoint rejected a code exchange or refresh
    TokenEndpoint,
}

/// Errors produced by the WHOOP client
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Bad caller input or configuration, never retried
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong with the configuration
        message: String,
    },

    /// Missing, invalid or unrefreshable credentials
    #[error("Authentication failed: {message}")]
    Auth {
        /// Human readable reason
        message: String,
        /// Component that rejected the credentials
        origin: AuthOrigin,
        /// HTTP status that produced the error, if any
        status: Option<u16>,
        /// `error` field returned by the OAuth server
        error: Option<String>,
        /// `error_description` field returned by the OAuth server
        error_description: Option<String>,
    },

    /// Upstream throttling (HTTP 429)
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        /// Server supplied `Retry-After` in seconds
        retry_after_secs: Option<u64>,
        /// Response detail
        message: String,
    },

    /// Request rejected as malformed (local validation, HTTP 400 or 422)
    #[error("Validation failed: {message}")]
    Validation {
        /// Offending field when known
        field: Option<String>,
        /// Validation detail
        message: String,
        /// HTTP status when produced by the server
        status: Option<u16>,
    },

    /// Resource does not exist (HTTP 404)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Path or identifier of the missing resource
        resource: String,
    },

    /// Any other non-success HTTP response
    #[error("WHOOP API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response detail
        message: String,
    },

    /// Transport-level failure (DNS, connect, reset)
    #[error("Network error: {message}")]
    Network {
        /// Transport detail
        message: String,
    },

    /// Per-request timer fired or the caller aborted the request
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that was in effect
        timeout_ms: u64,
    },

    /// Pending work cancelled through the deduplicator
    #[error("Request cancelled: {key}")]
    Cancelled {
        /// Dedup key of the cancelled request
        key: String,
    },

    /// Response body could not be decoded into the expected type
    #[error("Serialization error: {message}")]
    Serialization {
        /// Decoder detail
        message: String,
    },

    /// Client bug or invariant violation
    #[error("Internal error: {message}")]
    Internal {
        /// Detail
        message: String,
    },
}

impl ClientError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an authentication error with no server context
    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
            origin: AuthOrigin::Client,
            status: None,
            error: None,
            error_description: None,
        }
    }

    /// Create an error for a rejected token endpoint request
    #[must_use]
    pub fn token_endpoint(
        message: impl Into<String>,
        status: u16,
        error: Option<String>,
        error_description: Option<String>,
    ) -> Self {
        Self::Auth {
            message: message.into(),
            origin: AuthOrigin::TokenEndpoint,
            status: Some(status),
            error,
            error_description,
        }
    }

    /// Create a local validation error for a specific field
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: Some(field.into()),
            message: message.into(),
            status: None,
        }
    }

    /// Create a network error
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an internal error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Map a non-success HTTP response onto the taxonomy
    #[must_use]
    pub fn from_status(status: u16, body: &str, path: &str, retry_after_secs: Option<u64>) -> Self {
        match status {
            401 => Self::Auth {
                message: "Access token expired or invalid".to_owned(),
                origin: AuthOrigin::Api,
                status: Some(status),
                error: None,
                error_description: non_empty(body),
            },
            403 => Self::Auth {
                message: "Access token lacks the required scope".to_owned(),
                origin: AuthOrigin::Api,
                status: Some(status),
                error: None,
                error_description: non_empty(body),
            },
            404 => Self::NotFound {
                resource: path.to_owned(),
            },
            400 | 422 => Self::Validation {
                field: None,
                message: non_empty(body).unwrap_or_else(|| "Request rejected".to_owned()),
                status: Some(status),
            },
            429 => Self::RateLimit {
                retry_after_secs,
                message: non_empty(body).unwrap_or_else(|| "API rate limit".to_owned()),
            },
            _ => Self::Api {
                status,
                message: non_empty(body).unwrap_or_else(|| format!("HTTP {status}")),
            },
        }
    }

    /// Stable error code for this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Config { .. } => ErrorCode::ConfigInvalid,
            Self::Auth { status: None, .. } => ErrorCode::AuthRequired,
            Self::Auth { .. } => ErrorCode::AuthInvalid,
            Self::RateLimit { .. } => ErrorCode::RateLimitExceeded,
            Self::Validation { .. } => ErrorCode::InvalidInput,
            Self::NotFound { .. } => ErrorCode::ResourceNotFound,
            Self::Api { status, .. } if *status >= 500 => ErrorCode::ExternalServiceUnavailable,
            Self::Api { .. } => ErrorCode::ExternalServiceError,
            Self::Network { .. } => ErrorCode::NetworkError,
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::Cancelled { .. } => ErrorCode::Cancelled,
            Self::Serialization { .. } => ErrorCode::SerializationError,
            Self::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// HTTP status associated with the error, if it came from a response
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Validation { status, .. } => *status,
            Self::RateLimit { .. } => Some(429),
            Self::NotFound { .. } => Some(404),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is an API 401, the response that triggers a token refresh
    ///
    /// Rejections from the token endpoint itself never qualify.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Auth {
                origin: AuthOrigin::Api,
                status: Some(401),
                ..
            }
        )
    }

    /// Whether the retry policy may attempt the operation again
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimit { .. } | Self::Network { .. } | Self::Timeout { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Delay suggested by the error itself, overriding exponential backoff
    #[must_use]
    pub fn retry_hint(&self) -> Option<Duration> {
        match self {
            Self::RateLimit {
                retry_after_secs, ..
            } => Some(Duration::from_secs(
                retry_after_secs.unwrap_or(RATE_LIMIT_DEFAULT_RETRY_SECS),
            )),
            Self::Network { .. } | Self::Timeout { .. } => {
                Some(Duration::from_millis(NETWORK_RETRY_HINT_MS))
            }
            _ => None,
        }
    }
}

fn non_empty(body: &str) -> Option<String> {
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}
