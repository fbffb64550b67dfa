// ABOUTME: OAuth endpoints and token lifecycle constants for WHOOP
// ABOUTME: Includes token URL, default scopes, and the proactive refresh buffer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Provider identifier used in logs
pub const WHOOP: &str = "whoop";

/// Token endpoint for code exchange and refresh
pub const WHOOP_TOKEN_URL: &str = "https://api.prod.whoop.com/oauth/oauth2/token";

/// Default scopes requested by WHOOP integrations
pub const WHOOP_DEFAULT_SCOPES: &str =
    "offline read:profile read:body_measurement read:cycles read:recovery read:sleep read:workout";

/// Tokens are treated as expired this long before the server would reject them
pub const TOKEN_EXPIRY_BUFFER_SECS: u64 = 300; // 5 minutes

/// Token type assumed when the server omits it
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Request timeout for token endpoint calls
pub const OAUTH_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Connect timeout for token endpoint calls
pub const OAUTH_CONNECT_TIMEOUT_SECS: u64 = 5;
