// ABOUTME: WHOOP recovery model attached to a cycle and its sleep
// ABOUTME: Carries recovery percentage, resting heart rate, and HRV
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ScoreState;

/// Recovery for one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recovery {
    /// Cycle the recovery belongs to
    pub cycle_id: i64,
    /// Sleep the recovery was computed from (UUID string in v2)
    pub sleep_id: String,
    /// Owner
    pub user_id: i64,
    /// Record creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
    /// Scoring state
    pub score_state: ScoreState,
    /// Present when scored
    #[serde(default)]
    pub score: Option<RecoveryScore>,
}

/// Recovery score details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryScore {
    /// Whether the user is still calibrating
    pub user_calibrating: bool,
    /// Recovery score as percentage (0-100)
    pub recovery_score: f64,
    /// Resting heart rate
    pub resting_heart_rate: f64,
    /// Heart rate variability (RMSSD) in milliseconds
    pub hrv_rmssd_milli: f64,
    /// Blood oxygen percentage
    #[serde(default)]
    pub spo2_percentage: Option<f64>,
    /// Skin temperature in Celsius
    #[serde(default)]
    pub skin_temp_celsius: Option<f64>,
}
