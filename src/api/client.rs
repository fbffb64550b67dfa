// ABOUTME: Typed WHOOP API client exposing one method per endpoint
// ABOUTME: Every call goes through the request pipeline with a per-resource cache lifetime
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::info;
use whoop_core::constants::api::{
    BODY_MEASUREMENT_PATH, CYCLE_PATH, PROFILE_PATH, RECOVERY_PATH, SLEEP_PATH, WORKOUT_PATH,
};
use whoop_core::constants::cache::{
    TTL_BODY_MEASUREMENT_SECS, TTL_COLLECTION_SECS, TTL_PROFILE_SECS, TTL_RECORD_SECS,
};
use whoop_core::models::{
    BodyMeasurement, Cycle, OAuthTokenSet, Paginated, Recovery, Sleep, UserBasicProfile, Workout,
};
use whoop_core::{ClientError, ClientResult};

use super::params::{validate_activity_id, validate_cycle_id, CollectionParams};
use super::stream::{paginate, RecordStream, StreamConfig};
use crate::cache::CacheStats;
use crate::config::ClientConfig;
use crate::dedup::DedupStats;
use crate::http_client::{RequestOptions, RequestPipeline};
use crate::oauth2_client::{OAuth2Client, OAuth2Config, TokenManager};

/// WHOOP developer API client
pub struct WhoopClient {
    pipeline: RequestPipeline,
    oauth: Option<Arc<OAuth2Client>>,
}

impl WhoopClient {
    /// Client without OAuth; requests carry no bearer token
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self::from_pipeline(RequestPipeline::new(config)?))
    }

    /// Client that authenticates through the WHOOP token endpoint
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate
    pub fn with_oauth(config: &ClientConfig, oauth: OAuth2Config) -> ClientResult<Self> {
        let oauth = Arc::new(OAuth2Client::new(oauth));
        let manager = Arc::new(TokenManager::new(oauth.clone()));
        let pipeline = RequestPipeline::new(config)?.with_token_manager(manager);
        Ok(Self {
            pipeline,
            oauth: Some(oauth),
        })
    }

    /// Client over a pre-built pipeline
    #[must_use]
    pub const fn from_pipeline(pipeline: RequestPipeline) -> Self {
        Self {
            pipeline,
            oauth: None,
        }
    }

    /// Underlying request pipeline
    #[must_use]
    pub const fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    /// Token manager, if the client authenticates
    #[must_use]
    pub fn token_manager(&self) -> Option<&Arc<TokenManager>> {
        self.pipeline.token_manager()
    }

    /// Exchange an authorization code and store the resulting tokens
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the client was built without OAuth, or the
    /// token endpoint's error
    pub async fn authenticate_with_code(&self, code: &str) -> ClientResult<OAuthTokenSet> {
        let (Some(oauth), Some(manager)) = (&self.oauth, self.pipeline.token_manager()) else {
            return Err(ClientError::config("OAuth is not configured for this client"));
        };
        let tokens = oauth.exchange_code(code).await?;
        manager.set_tokens(tokens.clone());
        info!("Authenticated with WHOOP");
        Ok(tokens)
    }

    /// Store tokens obtained elsewhere
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the client has no token manager
    pub fn set_tokens(&self, tokens: OAuthTokenSet) -> ClientResult<()> {
        let manager = self
            .pipeline
            .token_manager()
            .ok_or_else(|| ClientError::config("OAuth is not configured for this client"))?;
        manager.set_tokens(tokens);
        Ok(())
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        ttl_secs: u64,
    ) -> ClientResult<T> {
        let options = RequestOptions::default().with_cache_ttl(Duration::from_secs(ttl_secs));
        self.pipeline.get(path, query, options).await
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &CollectionParams,
    ) -> ClientResult<Paginated<T>> {
        let query = params.to_query()?;
        self.fetch(path, &query, TTL_COLLECTION_SECS).await
    }

    /// Basic profile of the authenticated user
    ///
    /// # Errors
    ///
    /// Returns the pipeline error
    pub async fn get_profile(&self) -> ClientResult<UserBasicProfile> {
        self.fetch(PROFILE_PATH, &[], TTL_PROFILE_SECS).await
    }

    /// Height, weight and max heart rate
    ///
    /// # Errors
    ///
    /// Returns the pipeline error
    pub async fn get_body_measurement(&self) -> ClientResult<BodyMeasurement> {
        self.fetch(BODY_MEASUREMENT_PATH, &[], TTL_BODY_MEASUREMENT_SECS)
            .await
    }

    /// One page of physiological cycles
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad `params`, otherwise the pipeline error
    pub async fn get_cycles(&self, params: &CollectionParams) -> ClientResult<Paginated<Cycle>> {
        self.fetch_page(CYCLE_PATH, params).await
    }

    /// A single cycle
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive id, otherwise the pipeline error
    pub async fn get_cycle(&self, cycle_id: i64) -> ClientResult<Cycle> {
        validate_cycle_id(cycle_id)?;
        self.fetch(&format!("{CYCLE_PATH}/{cycle_id}"), &[], TTL_RECORD_SECS)
            .await
    }

    /// Recovery scored for a cycle
    ///
    /// # Errors
    ///
    /// See [`WhoopClient::get_cycle`]
    pub async fn get_cycle_recovery(&self, cycle_id: i64) -> ClientResult<Recovery> {
        validate_cycle_id(cycle_id)?;
        self.fetch(
            &format!("{CYCLE_PATH}/{cycle_id}/recovery"),
            &[],
            TTL_RECORD_SECS,
        )
        .await
    }

    /// Sleep that ended a cycle
    ///
    /// # Errors
    ///
    /// See [`WhoopClient::get_cycle`]
    pub async fn get_cycle_sleep(&self, cycle_id: i64) -> ClientResult<Sleep> {
        validate_cycle_id(cycle_id)?;
        self.fetch(
            &format!("{CYCLE_PATH}/{cycle_id}/sleep"),
            &[],
            TTL_RECORD_SECS,
        )
        .await
    }

    /// One page of recoveries
    ///
    /// # Errors
    ///
    /// See [`WhoopClient::get_cycles`]
    pub async fn get_recoveries(
        &self,
        params: &CollectionParams,
    ) -> ClientResult<Paginated<Recovery>> {
        self.fetch_page(RECOVERY_PATH, params).await
    }

    /// One page of sleeps
    ///
    /// # Errors
    ///
    /// See [`WhoopClient::get_cycles`]
    pub async fn get_sleeps(&self, params: &CollectionParams) -> ClientResult<Paginated<Sleep>> {
        self.fetch_page(SLEEP_PATH, params).await
    }

    /// A single sleep by UUID
    ///
    /// # Errors
    ///
    /// Returns a validation error if `sleep_id` is not a UUID, otherwise the pipeline error
    pub async fn get_sleep(&self, sleep_id: &str) -> ClientResult<Sleep> {
        validate_activity_id("sleep_id", sleep_id)?;
        self.fetch(&format!("{SLEEP_PATH}/{sleep_id}"), &[], TTL_RECORD_SECS)
            .await
    }

    /// One page of workouts
    ///
    /// # Errors
    ///
    /// See [`WhoopClient::get_cycles`]
    pub async fn get_workouts(
        &self,
        params: &CollectionParams,
    ) -> ClientResult<Paginated<Workout>> {
        self.fetch_page(WORKOUT_PATH, params).await
    }

    /// A single workout by UUID
    ///
    /// # Errors
    ///
    /// Returns a validation error if `workout_id` is not a UUID, otherwise the pipeline error
    pub async fn get_workout(&self, workout_id: &str) -> ClientResult<Workout> {
        validate_activity_id("workout_id", workout_id)?;
        self.fetch(
            &format!("{WORKOUT_PATH}/{workout_id}"),
            &[],
            TTL_RECORD_SECS,
        )
        .await
    }

    /// Every cycle matching `params`, page by page
    pub fn cycles_stream(
        &self,
        params: CollectionParams,
        config: StreamConfig,
    ) -> RecordStream<'_, Cycle> {
        paginate(params, config, move |page| async move {
            self.get_cycles(&page).await
        })
    }

    /// Every recovery matching `params`, page by page
    pub fn recoveries_stream(
        &self,
        params: CollectionParams,
        config: StreamConfig,
    ) -> RecordStream<'_, Recovery> {
        paginate(params, config, move |page| async move {
            self.get_recoveries(&page).await
        })
    }

    /// Every sleep matching `params`, page by page
    pub fn sleeps_stream(
        &self,
        params: CollectionParams,
        config: StreamConfig,
    ) -> RecordStream<'_, Sleep> {
        paginate(params, config, move |page| async move {
            self.get_sleeps(&page).await
        })
    }

    /// Every workout matching `params`, page by page
    pub fn workouts_stream(
        &self,
        params: CollectionParams,
        config: StreamConfig,
    ) -> RecordStream<'_, Workout> {
        paginate(params, config, move |page| async move {
            self.get_workouts(&page).await
        })
    }

    /// Response cache counters
    pub async fn cache_stats(&self) -> CacheStats {
        self.pipeline.cache_stats().await
    }

    /// Deduplication counters
    #[must_use]
    pub fn dedup_stats(&self) -> DedupStats {
        self.pipeline.dedup_stats()
    }

    /// Drop every cached response
    pub async fn clear_cache(&self) {
        self.pipeline.cache().clear().await;
    }
}
