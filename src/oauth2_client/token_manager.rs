// ABOUTME: Holds the current OAuth token set and refreshes it before expiry
// ABOUTME: Concurrent refresh attempts share a single in-flight exchange
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use whoop_core::constants::oauth::TOKEN_EXPIRY_BUFFER_SECS;
use whoop_core::models::OAuthTokenSet;
use whoop_core::{ClientError, ClientResult};

use super::client::TokenRefresher;

type RefreshOutcome = Shared<BoxFuture<'static, ClientResult<OAuthTokenSet>>>;

struct HeldTokens {
    tokens: OAuthTokenSet,
    issued_at: Instant,
}

#[derive(Default)]
struct TokenState {
    current: Option<HeldTokens>,
    refresh_in_flight: Option<(u64, RefreshOutcome)>,
    generation: u64,
}

fn lock_state(state: &Mutex<TokenState>) -> MutexGuard<'_, TokenState> {
    state.lock().unwrap_or_else(|poisoned| {
        warn!("Token manager lock poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Whether a token issued at `issued_at` is within `buffer` of its expiry at `now`
#[must_use]
pub fn is_expired_at(
    tokens: &OAuthTokenSet,
    issued_at: Instant,
    buffer: Duration,
    now: Instant,
) -> bool {
    let usable_for = Duration::from_secs(tokens.expires_in_secs).saturating_sub(buffer);
    now >= issued_at + usable_for
}

/// Owner of the OAuth token lifecycle
///
/// A token counts as expired once `now >= issued_at + expires_in - buffer`, so it is
/// replaced before the server would reject it. Refreshes are single-flight: callers
/// that arrive while one is running await the same exchange. A failed refresh clears
/// the held tokens, so later calls fail fast until new tokens are set.
pub struct TokenManager {
    refresher: Arc<dyn TokenRefresher>,
    state: Arc<Mutex<TokenState>>,
    expiry_buffer: Duration,
}

impl TokenManager {
    /// Create a manager with no tokens and the default 5 minute expiry buffer
    #[must_use]
    pub fn new(refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            refresher,
            state: Arc::new(Mutex::new(TokenState::default())),
            expiry_buffer: Duration::from_secs(TOKEN_EXPIRY_BUFFER_SECS),
        }
    }

    /// Override the expiry buffer
    #[must_use]
    pub const fn with_expiry_buffer(mut self, buffer: Duration) -> Self {
        self.expiry_buffer = buffer;
        self
    }

    fn lock(&self) -> MutexGuard<'_, TokenState> {
        lock_state(&self.state)
    }

    /// Replace the held tokens; the expiry clock starts now
    pub fn set_tokens(&self, tokens: OAuthTokenSet) {
        self.lock().current = Some(HeldTokens {
            tokens,
            issued_at: Instant::now(),
        });
    }

    /// Currently held tokens
    #[must_use]
    pub fn tokens(&self) -> Option<OAuthTokenSet> {
        self.lock().current.as_ref().map(|held| held.tokens.clone())
    }

    /// Drop all held tokens; API calls fail until re-authentication
    pub fn clear_tokens(&self) {
        self.lock().current = None;
        debug!("Cleared WHOOP tokens");
    }

    /// Whether the held token is expired or absent
    #[must_use]
    pub fn is_token_expired(&self) -> bool {
        match self.lock().current.as_ref() {
            Some(held) => is_expired_at(
                &held.tokens,
                held.issued_at,
                self.expiry_buffer,
                Instant::now(),
            ),
            None => true,
        }
    }

    /// Access token for the next request, refreshing first when it is expired
    ///
    /// # Errors
    ///
    /// Returns an auth error if no tokens are held, or the refresh error when an
    /// expired token cannot be refreshed
    pub async fn get_valid_access_token(&self) -> ClientResult<String> {
        let (access_token, expired) = {
            let state = self.lock();
            let Some(held) = state.current.as_ref() else {
                return Err(ClientError::auth(
                    "No tokens available. Complete the OAuth flow or call set_tokens first",
                ));
            };
            let expired = is_expired_at(
                &held.tokens,
                held.issued_at,
                self.expiry_buffer,
                Instant::now(),
            );
            (held.tokens.access_token.clone(), expired)
        };

        if !expired {
            return Ok(access_token);
        }

        debug!("Access token expired or about to expire, refreshing");
        Ok(self.refresh_access_token(None).await?.access_token)
    }

    /// Exchange a refresh token for a new token set and store it
    ///
    /// Uses `refresh_token_override` when given, otherwise the held refresh token. A
    /// response without a refresh token keeps the one that was used.
    ///
    /// # Errors
    ///
    /// Returns an auth error if no refresh token is available, or whatever the
    /// refresher produced. The held tokens are cleared when the refresher fails.
    pub async fn refresh_access_token(
        &self,
        refresh_token_override: Option<&str>,
    ) -> ClientResult<OAuthTokenSet> {
        let outcome = {
            let mut state = self.lock();
            if let Some((_, in_flight)) = &state.refresh_in_flight {
                debug!("Joining in-flight token refresh");
                in_flight.clone()
            } else {
                let refresh_token = refresh_token_override
                    .map(str::to_owned)
                    .or_else(|| {
                        state
                            .current
                            .as_ref()
                            .and_then(|held| held.tokens.refresh_token.clone())
                    })
                    .ok_or_else(|| ClientError::auth("No refresh token available"))?;

                state.generation += 1;
                let generation = state.generation;
                let outcome = run_refresh(
                    Arc::clone(&self.refresher),
                    Arc::clone(&self.state),
                    refresh_token,
                    generation,
                )
                .boxed()
                .shared();
                state.refresh_in_flight = Some((generation, outcome.clone()));
                outcome
            }
        };

        outcome.await
    }
}

async fn run_refresh(
    refresher: Arc<dyn TokenRefresher>,
    state: Arc<Mutex<TokenState>>,
    refresh_token: String,
    generation: u64,
) -> ClientResult<OAuthTokenSet> {
    info!("Refreshing WHOOP access token");
    let result = refresher.refresh(&refresh_token).await;

    let mut guard = lock_state(&state);
    if guard
        .refresh_in_flight
        .as_ref()
        .is_some_and(|(current, _)| *current == generation)
    {
        guard.refresh_in_flight = None;
    }

    match result {
        Ok(mut tokens) => {
            if tokens.refresh_token.is_none() {
                tokens.refresh_token = Some(refresh_token);
            }
            guard.current = Some(HeldTokens {
                tokens: tokens.clone(),
                issued_at: Instant::now(),
            });
            info!(expires_in = tokens.expires_in_secs, "WHOOP access token refreshed");
            Ok(tokens)
        }
        Err(e) => {
            // Held tokens cannot be refreshed any more; callers must re-authenticate
            guard.current = None;
            error!("WHOOP token refresh failed, tokens cleared: {e}");
            Err(e)
        }
    }
}
