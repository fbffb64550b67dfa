// ABOUTME: WHOOP user profile and body measurement models
// ABOUTME: Returned by the user endpoints of the developer API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// Basic user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBasicProfile {
    /// User ID (integer in WHOOP)
    pub user_id: i64,
    /// User's email address
    pub email: String,
    /// User's first name
    pub first_name: String,
    /// User's last name
    pub last_name: String,
}

/// Body measurements recorded for the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyMeasurement {
    /// Height in meters
    pub height_meter: f64,
    /// Weight in kilograms
    pub weight_kilogram: f64,
    /// Maximum heart rate in bpm
    pub max_heart_rate: u32,
}
