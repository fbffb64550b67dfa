// ABOUTME: Unit conversion helpers for WHOOP metric values
// ABOUTME: Energy, duration, distance and mass conversions used when presenting data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use whoop_core::constants::units::{
    FEET_PER_METER, KCAL_PER_KJ, METERS_PER_KM, METERS_PER_MILE, MS_PER_HOUR, MS_PER_MINUTE,
    POUNDS_PER_KG,
};

/// Kilojoules to kilocalories
#[must_use]
pub fn kilojoules_to_kcal(kilojoules: f64) -> f64 {
    kilojoules * KCAL_PER_KJ
}

/// Milliseconds to minutes
#[must_use]
pub fn millis_to_minutes(millis: u64) -> f64 {
    millis as f64 / MS_PER_MINUTE
}

/// Milliseconds to hours
#[must_use]
pub fn millis_to_hours(millis: u64) -> f64 {
    millis as f64 / MS_PER_HOUR
}

/// Meters to kilometers
#[must_use]
pub fn meters_to_km(meters: f64) -> f64 {
    meters / METERS_PER_KM
}

/// Meters to statute miles
#[must_use]
pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

/// Meters to feet
#[must_use]
pub fn meters_to_feet(meters: f64) -> f64 {
    meters * FEET_PER_METER
}

/// Kilograms to pounds
#[must_use]
pub fn kg_to_pounds(kilograms: f64) -> f64 {
    kilograms * POUNDS_PER_KG
}
