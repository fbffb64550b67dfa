// ABOUTME: WHOOP workout activity model with strain and heart rate zones
// ABOUTME: Sport identifiers follow the WHOOP sport catalogue
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ScoreState;

/// Workout activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Unique workout ID (UUID string in v2)
    pub id: String,
    /// Owner
    pub user_id: i64,
    /// Record creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
    /// Start time of workout
    pub start: DateTime<Utc>,
    /// End time of workout
    pub end: DateTime<Utc>,
    /// Offset such as `-05:00`
    #[serde(default)]
    pub timezone_offset: Option<String>,
    /// Sport name
    #[serde(default)]
    pub sport_name: Option<String>,
    /// Sport ID (WHOOP internal sport classification)
    #[serde(default)]
    pub sport_id: Option<i32>,
    /// Scoring state
    pub score_state: ScoreState,
    /// Present when scored
    #[serde(default)]
    pub score: Option<WorkoutScore>,
}

/// Workout score details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutScore {
    /// Strain score (0-21 scale)
    pub strain: f64,
    /// Average heart rate during workout
    pub average_heart_rate: u32,
    /// Maximum heart rate during workout
    pub max_heart_rate: u32,
    /// Kilojoules burned
    pub kilojoule: f64,
    /// Percentage of the workout with heart rate data
    #[serde(default)]
    pub percent_recorded: Option<f64>,
    /// Distance in meters (for applicable activities)
    #[serde(default)]
    pub distance_meter: Option<f64>,
    /// Altitude gain in meters
    #[serde(default)]
    pub altitude_gain_meter: Option<f64>,
    /// Net altitude change in meters
    #[serde(default)]
    pub altitude_change_meter: Option<f64>,
    /// Time spent in each heart rate zone
    #[serde(default)]
    pub zone_durations: Option<ZoneDurations>,
}

/// Milliseconds spent in each heart rate zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneDurations {
    /// Below zone one
    pub zone_zero_milli: u64,
    /// Zone one
    pub zone_one_milli: u64,
    /// Zone two
    pub zone_two_milli: u64,
    /// Zone three
    pub zone_three_milli: u64,
    /// Zone four
    pub zone_four_milli: u64,
    /// Zone five
    pub zone_five_milli: u64,
}
