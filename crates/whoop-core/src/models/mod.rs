// ABOUTME: WHOOP resource models and OAuth token types
// ABOUTME: Typed views of the profile, cycle, recovery, sleep, and workout resources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Physiological cycles
pub mod cycle;
/// OAuth token set and token endpoint payloads
pub mod oauth;
/// Paginated collection envelope
pub mod pagination;
/// User profile and body measurements
pub mod profile;
/// Recovery scores
pub mod recovery;
/// Sleep activities
pub mod sleep;
/// Workout activities
pub mod workout;

use serde::{Deserialize, Serialize};

pub use cycle::{Cycle, CycleScore};
pub use oauth::{OAuthTokenSet, TokenErrorResponse};
pub use pagination::Paginated;
pub use profile::{BodyMeasurement, UserBasicProfile};
pub use recovery::{Recovery, RecoveryScore};
pub use sleep::{Sleep, SleepNeeded, SleepScore, SleepStageSummary};
pub use workout::{Workout, WorkoutScore, ZoneDurations};

/// Scoring state attached to every scored WHOOP resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreState {
    /// Score has been computed
    Scored,
    /// Score is still being computed
    PendingScore,
    /// Not enough data to produce a score
    Unscorable,
}
