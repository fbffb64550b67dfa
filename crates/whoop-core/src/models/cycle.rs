// ABOUTME: WHOOP physiological cycle model (one day of strain)
// ABOUTME: An open cycle has no end timestamp yet
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ScoreState;

/// Daily physiological cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    /// Cycle identifier
    pub id: i64,
    /// Owner of the cycle
    pub user_id: i64,
    /// Record creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
    /// Start of the cycle
    pub start: DateTime<Utc>,
    /// End of the cycle, absent while the cycle is in progress
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    /// Offset such as `-05:00`
    #[serde(default)]
    pub timezone_offset: Option<String>,
    /// Scoring state
    pub score_state: ScoreState,
    /// Present when `score_state` is `SCORED`
    #[serde(default)]
    pub score: Option<CycleScore>,
}

/// Strain and energy totals for a cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleScore {
    /// Strain score (0-21 scale)
    pub strain: f64,
    /// Energy expenditure in kilojoules
    pub kilojoule: f64,
    /// Average heart rate
    pub average_heart_rate: u32,
    /// Maximum heart rate
    pub max_heart_rate: u32,
}
