// ABOUTME: OAuth token set held by the token manager and token endpoint payloads
// ABOUTME: Mirrors the WHOOP token endpoint response shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use crate::constants::oauth::DEFAULT_TOKEN_TYPE;

fn default_token_type() -> String {
    DEFAULT_TOKEN_TYPE.to_owned()
}

/// Tokens returned by a code exchange or refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTokenSet {
    /// Bearer credential attached to API calls
    pub access_token: String,
    /// Credential used to obtain a new access token
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds, relative to issue time
    #[serde(rename = "expires_in")]
    pub expires_in_secs: u64,
    /// Usually `bearer`
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Space separated scopes granted
    #[serde(default)]
    pub scope: Option<String>,
}

impl OAuthTokenSet {
    /// Create a bearer token set
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: u64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_in_secs,
            token_type: default_token_type(),
            scope: None,
        }
    }
}

/// Error body returned by the token endpoint (RFC 6749 section 5.2)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenErrorResponse {
    /// Error code such as `invalid_grant`
    #[serde(default)]
    pub error: Option<String>,
    /// Human readable detail
    #[serde(default)]
    pub error_description: Option<String>,
}
