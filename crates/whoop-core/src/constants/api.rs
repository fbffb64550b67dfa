// ABOUTME: WHOOP developer API base URL, endpoint paths, and collection limits
// ABOUTME: Centralizes path templates used by the endpoint layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Production API root for the v2 developer API
pub const DEFAULT_API_BASE_URL: &str = "https://api.prod.whoop.com/developer";

/// Basic user profile
pub const PROFILE_PATH: &str = "/v2/user/profile/basic";

/// Body measurements (height, weight, max heart rate)
pub const BODY_MEASUREMENT_PATH: &str = "/v2/user/measurement/body";

/// Physiological cycle collection
pub const CYCLE_PATH: &str = "/v2/cycle";

/// Recovery collection
pub const RECOVERY_PATH: &str = "/v2/recovery";

/// Sleep collection
pub const SLEEP_PATH: &str = "/v2/activity/sleep";

/// Workout collection
pub const WORKOUT_PATH: &str = "/v2/activity/workout";

/// Largest page the collection endpoints accept
pub const MAX_PAGE_LIMIT: u32 = 25;

/// Page size used when the caller does not pick one
pub const DEFAULT_PAGE_LIMIT: u32 = 10;
