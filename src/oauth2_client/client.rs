// ABOUTME: OAuth2 token endpoint client for WHOOP code exchange and token refresh
// ABOUTME: Defines the TokenRefresher seam consumed by the token manager
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use whoop_core::constants::oauth::{
    OAUTH_CONNECT_TIMEOUT_SECS, OAUTH_REQUEST_TIMEOUT_SECS, WHOOP_DEFAULT_SCOPES, WHOOP_TOKEN_URL,
};
use whoop_core::models::{OAuthTokenSet, TokenErrorResponse};
use whoop_core::{ClientError, ClientResult};

/// OAuth 2.0 client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Config {
    /// OAuth client ID issued by WHOOP
    pub client_id: String,
    /// OAuth client secret issued by WHOOP
    pub client_secret: String,
    /// Token endpoint URL
    pub token_url: String,
    /// Redirect URI registered for the application
    pub redirect_uri: String,
    /// OAuth scopes requested during refresh
    pub scopes: Vec<String>,
}

impl OAuth2Config {
    /// Configuration for the production WHOOP token endpoint
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: WHOOP_TOKEN_URL.to_owned(),
            redirect_uri: redirect_uri.into(),
            scopes: WHOOP_DEFAULT_SCOPES
                .split_whitespace()
                .map(str::to_owned)
                .collect(),
        }
    }

    /// Load credentials from `WHOOP_CLIENT_ID`, `WHOOP_CLIENT_SECRET` and `WHOOP_REDIRECT_URI`
    ///
    /// `WHOOP_TOKEN_URL` overrides the token endpoint when set.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a required variable is missing or empty
    pub fn from_env() -> ClientResult<Self> {
        let mut config = Self::new(
            required_var("WHOOP_CLIENT_ID")?,
            required_var("WHOOP_CLIENT_SECRET")?,
            required_var("WHOOP_REDIRECT_URI")?,
        );
        if let Ok(token_url) = env::var("WHOOP_TOKEN_URL") {
            config.token_url = token_url;
        }
        Ok(config)
    }
}

fn required_var(name: &str) -> ClientResult<String> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ClientError::config(format!("{name} must be set")))
}

/// Performs the refresh-token HTTP exchange for the token manager
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Exchange `refresh_token` for a new token set
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] when the token endpoint rejects the request and
    /// [`ClientError::Network`] when it cannot be reached.
    async fn refresh(&self, refresh_token: &str) -> ClientResult<OAuthTokenSet>;
}

/// OAuth 2.0 client for the WHOOP token endpoint
pub struct OAuth2Client {
    config: OAuth2Config,
    client: Client,
}

impl OAuth2Client {
    /// Create a client with short timeouts suited to token exchanges
    #[must_use]
    pub fn new(config: OAuth2Config) -> Self {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(OAUTH_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(OAUTH_CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_http_client(config, client)
    }

    /// Create a client over an existing `reqwest::Client`
    #[must_use]
    pub const fn with_http_client(config: OAuth2Config, client: Client) -> Self {
        Self { config, client }
    }

    /// Get the `OAuth2` configuration
    #[must_use]
    pub const fn config(&self) -> &OAuth2Config {
        &self.config
    }

    /// Exchange an authorization code for tokens
    ///
    /// # Errors
    ///
    /// Returns an auth error carrying the server's `error` / `error_description` if the
    /// exchange is rejected, or a network error if the endpoint is unreachable
    pub async fn exchange_code(&self, code: &str) -> ClientResult<OAuthTokenSet> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        self.request_tokens(&params).await
    }

    /// Refresh an expired access token
    ///
    /// # Errors
    ///
    /// Same as [`OAuth2Client::exchange_code`]
    pub async fn refresh_token(&self, refresh_token: &str) -> ClientResult<OAuthTokenSet> {
        let scope = self.config.scopes.join(" ");
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
            ("scope", scope.as_str()),
        ];
        self.request_tokens(&params).await
    }

    async fn request_tokens(&self, params: &[(&str, &str)]) -> ClientResult<OAuthTokenSet> {
        let response = self
            .client
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| ClientError::network(format!("Token endpoint unreachable: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::network(format!("Failed to read token response: {e}")))?;

        if !status.is_success() {
            let detail: TokenErrorResponse = serde_json::from_str(&body).unwrap_or_default();
            error!(
                status = status.as_u16(),
                error = detail.error.as_deref().unwrap_or("unknown"),
                "WHOOP token request rejected"
            );
            return Err(ClientError::token_endpoint(
                format!("Token request failed with status {status}"),
                status.as_u16(),
                detail.error,
                detail.error_description,
            ));
        }

        let tokens: OAuthTokenSet = serde_json::from_str(&body)?;
        debug!(expires_in = tokens.expires_in_secs, "Received WHOOP token set");
        Ok(tokens)
    }
}

#[async_trait]
impl TokenRefresher for OAuth2Client {
    async fn refresh(&self, refresh_token: &str) -> ClientResult<OAuthTokenSet> {
        self.refresh_token(refresh_token).await
    }
}
