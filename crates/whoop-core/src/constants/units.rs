// ABOUTME: Unit conversion constants for energy, distance, mass, and time
// ABOUTME: Provides named constants to eliminate magic numbers in conversions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Kilocalories per kilojoule
pub const KCAL_PER_KJ: f64 = 0.239_006;

/// Meters per kilometer
pub const METERS_PER_KM: f64 = 1000.0;

/// Meters per statute mile
pub const METERS_PER_MILE: f64 = 1_609.344;

/// Feet per meter
pub const FEET_PER_METER: f64 = 3.280_84;

/// Pounds per kilogram
pub const POUNDS_PER_KG: f64 = 2.204_622_6;

/// Milliseconds per minute
pub const MS_PER_MINUTE: f64 = 60_000.0;

/// Milliseconds per hour
pub const MS_PER_HOUR: f64 = 3_600_000.0;
