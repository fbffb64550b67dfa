// ABOUTME: Tests for the OAuth token manager's expiry buffer and single-flight refresh
// ABOUTME: Uses a counting refresher and paused tokio time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::time::Duration;

use anyhow::Result;
use whoop_client::models::OAuthTokenSet;
use whoop_client::oauth2_client::TokenManager;
use whoop_client::ClientError;

mod common;

use common::{fresh_tokens, refresher, CountingRefresher};

#[tokio::test]
async fn test_no_tokens_is_auth_error() -> Result<()> {
    let (counting, dynamic) = refresher(CountingRefresher::new());
    let manager = TokenManager::new(dynamic);

    assert!(manager.is_token_expired());
    let error = manager.get_valid_access_token().await.unwrap_err();
    assert!(matches!(error, ClientError::Auth { status: None, .. }));
    assert_eq!(counting.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_valid_token_is_returned_without_refresh() -> Result<()> {
    let (counting, dynamic) = refresher(CountingRefresher::new());
    let manager = TokenManager::new(dynamic);
    manager.set_tokens(fresh_tokens());

    assert!(!manager.is_token_expired());
    assert_eq!(manager.get_valid_access_token().await?, "initial-access");
    assert_eq!(counting.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_token_inside_buffer_is_refreshed_once() -> Result<()> {
    let (counting, dynamic) = refresher(CountingRefresher::new());
    let manager = TokenManager::new(dynamic);
    manager.set_tokens(OAuthTokenSet::new(
        "short-lived",
        Some("initial-refresh".to_owned()),
        60,
    ));

    assert!(manager.is_token_expired());
    assert_eq!(manager.get_valid_access_token().await?, "access-1");
    assert_eq!(manager.get_valid_access_token().await?, "access-1");

    assert_eq!(counting.calls(), 1);
    assert_eq!(counting.received(), vec!["initial-refresh".to_owned()]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_refreshes_share_one_exchange() -> Result<()> {
    let (counting, dynamic) =
        refresher(CountingRefresher::new().with_delay(Duration::from_millis(100)));
    let manager = TokenManager::new(dynamic);
    manager.set_tokens(OAuthTokenSet::new("stale", Some("r".to_owned()), 0));

    let (a, b, c) = tokio::join!(
        manager.get_valid_access_token(),
        manager.get_valid_access_token(),
        manager.refresh_access_token(None),
    );

    assert_eq!(a?, "access-1");
    assert_eq!(b?, "access-1");
    assert_eq!(c?.access_token, "access-1");
    assert_eq!(counting.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_refresh_clears_tokens() -> Result<()> {
    let (counting, dynamic) = refresher(CountingRefresher::new());
    let manager = TokenManager::new(dynamic);
    manager.set_tokens(OAuthTokenSet::new("old", Some("initial-refresh".to_owned()), 0));
    counting.fail_next(true);

    let error = manager.get_valid_access_token().await.unwrap_err();
    assert!(matches!(
        error,
        ClientError::Auth { error: Some(ref code), .. } if code == "invalid_grant"
    ));
    assert!(manager.tokens().is_none());

    let again = manager.get_valid_access_token().await.unwrap_err();
    assert!(matches!(again, ClientError::Auth { status: None, .. }));
    assert_eq!(counting.calls(), 1, "no refresh is attempted once tokens are gone");
    Ok(())
}

#[tokio::test]
async fn test_refresh_succeeds_after_reauthentication() -> Result<()> {
    let (counting, dynamic) = refresher(CountingRefresher::new());
    let manager = TokenManager::new(dynamic);
    manager.set_tokens(fresh_tokens());

    counting.fail_next(true);
    assert!(manager.refresh_access_token(None).await.is_err());
    assert!(manager.is_token_expired());

    counting.fail_next(false);
    manager.set_tokens(fresh_tokens());
    let refreshed = manager.refresh_access_token(None).await?;
    assert_eq!(refreshed.access_token, "access-2");
    assert_eq!(counting.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_refresh_without_refresh_token_fails() -> Result<()> {
    let (counting, dynamic) = refresher(CountingRefresher::new());
    let manager = TokenManager::new(dynamic);
    manager.set_tokens(OAuthTokenSet::new("a", None, 0));

    let error = manager.get_valid_access_token().await.unwrap_err();
    assert!(matches!(error, ClientError::Auth { .. }));
    assert!(error.to_string().contains("No refresh token"));
    assert_eq!(counting.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_refresh_keeps_previous_refresh_token_when_not_rotated() -> Result<()> {
    let (_, dynamic) = refresher(CountingRefresher::new());
    let manager = TokenManager::new(dynamic);
    manager.set_tokens(fresh_tokens());

    let refreshed = manager.refresh_access_token(None).await?;
    assert_eq!(refreshed.refresh_token.as_deref(), Some("initial-refresh"));
    Ok(())
}

#[tokio::test]
async fn test_rotated_refresh_token_is_stored() -> Result<()> {
    let (counting, dynamic) = refresher(CountingRefresher::new().rotating());
    let manager = TokenManager::new(dynamic);
    manager.set_tokens(fresh_tokens());

    manager.refresh_access_token(None).await?;
    manager.refresh_access_token(None).await?;

    assert_eq!(
        counting.received(),
        vec!["initial-refresh".to_owned(), "refresh-1".to_owned()]
    );
    Ok(())
}

#[tokio::test]
async fn test_override_refresh_token_is_used() -> Result<()> {
    let (counting, dynamic) = refresher(CountingRefresher::new());
    let manager = TokenManager::new(dynamic);

    let tokens = manager.refresh_access_token(Some("from-storage")).await?;

    assert_eq!(tokens.access_token, "access-1");
    assert_eq!(counting.received(), vec!["from-storage".to_owned()]);
    assert_eq!(manager.tokens(), Some(tokens));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_expiry_boundary_honours_buffer() -> Result<()> {
    let (_, dynamic) = refresher(CountingRefresher::new());
    let manager = TokenManager::new(dynamic);
    manager.set_tokens(fresh_tokens());

    tokio::time::advance(Duration::from_secs(3299)).await;
    assert!(!manager.is_token_expired());

    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(manager.is_token_expired());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_custom_expiry_buffer() -> Result<()> {
    let (_, dynamic) = refresher(CountingRefresher::new());
    let manager = TokenManager::new(dynamic).with_expiry_buffer(Duration::ZERO);
    manager.set_tokens(OAuthTokenSet::new("a", None, 60));

    tokio::time::advance(Duration::from_secs(59)).await;
    assert!(!manager.is_token_expired());
    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(manager.is_token_expired());
    Ok(())
}

#[tokio::test]
async fn test_clear_tokens() -> Result<()> {
    let (_, dynamic) = refresher(CountingRefresher::new());
    let manager = TokenManager::new(dynamic);
    manager.set_tokens(fresh_tokens());

    manager.clear_tokens();

    assert!(manager.tokens().is_none());
    assert!(manager.is_token_expired());
    assert!(manager.get_valid_access_token().await.is_err());
    Ok(())
}
