// ABOUTME: WHOOP sleep activity model with stage summary and sleep need
// ABOUTME: Stage durations are reported in milliseconds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ScoreState;

/// Sleep activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sleep {
    /// Unique sleep ID (UUID string in v2)
    pub id: String,
    /// Cycle the sleep belongs to
    #[serde(default)]
    pub cycle_id: Option<i64>,
    /// Owner
    pub user_id: i64,
    /// Record creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
    /// Start time of sleep
    pub start: DateTime<Utc>,
    /// End time of sleep
    pub end: DateTime<Utc>,
    /// Offset such as `-05:00`
    #[serde(default)]
    pub timezone_offset: Option<String>,
    /// True for naps
    #[serde(default)]
    pub nap: bool,
    /// Scoring state
    pub score_state: ScoreState,
    /// Present when scored
    #[serde(default)]
    pub score: Option<SleepScore>,
}

/// Sleep score details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepScore {
    /// Stage summary breakdown
    pub stage_summary: SleepStageSummary,
    /// Sleep need breakdown
    pub sleep_needed: SleepNeeded,
    /// Respiratory rate during sleep
    #[serde(default)]
    pub respiratory_rate: Option<f64>,
    /// Sleep performance percentage (0-100)
    #[serde(default)]
    pub sleep_performance_percentage: Option<f64>,
    /// Sleep consistency percentage (0-100)
    #[serde(default)]
    pub sleep_consistency_percentage: Option<f64>,
    /// Sleep efficiency percentage (0-100)
    #[serde(default)]
    pub sleep_efficiency_percentage: Option<f64>,
}

/// Sleep stage summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepStageSummary {
    /// Total time in bed in milliseconds
    pub total_in_bed_time_milli: u64,
    /// Total awake time in milliseconds
    pub total_awake_time_milli: u64,
    /// Time without usable data in milliseconds
    #[serde(default)]
    pub total_no_data_time_milli: u64,
    /// Total light sleep time in milliseconds
    pub total_light_sleep_time_milli: u64,
    /// Total slow wave (deep) sleep time in milliseconds
    pub total_slow_wave_sleep_time_milli: u64,
    /// Total REM sleep time in milliseconds
    pub total_rem_sleep_time_milli: u64,
    /// Number of sleep cycles
    #[serde(default)]
    pub sleep_cycle_count: u32,
    /// Number of disturbances
    #[serde(default)]
    pub disturbance_count: u32,
}

impl SleepStageSummary {
    /// Time actually asleep (light + deep + REM) in milliseconds
    #[must_use]
    pub const fn total_sleep_time_milli(&self) -> u64 {
        self.total_light_sleep_time_milli
            + self.total_slow_wave_sleep_time_milli
            + self.total_rem_sleep_time_milli
    }
}

/// Sleep need breakdown in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepNeeded {
    /// Baseline need
    pub baseline_milli: u64,
    /// Extra need from accumulated sleep debt
    pub need_from_sleep_debt_milli: i64,
    /// Extra need from recent strain
    pub need_from_recent_strain_milli: i64,
    /// Credit from recent naps (negative)
    pub need_from_recent_nap_milli: i64,
}
