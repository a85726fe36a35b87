// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::constants::backoff::{
    INITIAL_INTERVAL_MILLIS, MAX_ELAPSED_TIME_SECS, MULTIPLIER, RANDOMIZATION_FACTOR,
};
use crate::error::{Result, WaitError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backoff settings as supplied by a caller.
///
/// Every field is optional; an absent field takes the documented default.
/// A present field is used as given, so an explicit `max_elapsed_time` of
/// zero means "no limit" while an explicit `initial_interval` of zero is
/// rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackoffSettings {
    /// Milliseconds before the first retry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_interval: Option<u64>,
    /// Seconds of total polling budget, 0 for unlimited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_elapsed_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub randomization_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
    /// Milliseconds, ceiling on a single wait
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_interval: Option<u64>,
}

impl BackoffSettings {
    /// Substitute defaults for absent fields and validate the result.
    pub fn resolve(&self) -> Result<BackoffConfig> {
        let initial_interval =
            Duration::from_millis(self.initial_interval.unwrap_or(INITIAL_INTERVAL_MILLIS));
        let max_elapsed_time = match self.max_elapsed_time {
            None => Some(Duration::from_secs(MAX_ELAPSED_TIME_SECS)),
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
        };

        BackoffConfig::new(
            initial_interval,
            self.max_interval.map(Duration::from_millis),
            self.multiplier.unwrap_or(MULTIPLIER),
            self.randomization_factor.unwrap_or(RANDOMIZATION_FACTOR),
            max_elapsed_time,
        )
    }
}

/// Validated, immutable backoff parameters for one poll operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackoffConfig {
    initial_interval: Duration,
    max_interval: Option<Duration>,
    multiplier: f64,
    randomization_factor: f64,
    max_elapsed_time: Option<Duration>,
}

impl BackoffConfig {
    /// `max_interval: None` leaves single waits unbounded,
    /// `max_elapsed_time: None` polls without a total budget.
    pub fn new(
        initial_interval: Duration,
        max_interval: Option<Duration>,
        multiplier: f64,
        randomization_factor: f64,
        max_elapsed_time: Option<Duration>,
    ) -> Result<Self> {
        if initial_interval.is_zero() {
            return Err(WaitError::Configuration(
                "initial_interval must be greater than zero".to_string(),
            ));
        }

        if let Some(max) = max_interval {
            if max < initial_interval {
                return Err(WaitError::Configuration(format!(
                    "max_interval ({:?}) must not be smaller than initial_interval ({:?})",
                    max, initial_interval
                )));
            }
        }

        if !multiplier.is_finite() || multiplier <= 1.0 {
            return Err(WaitError::Configuration(format!(
                "multiplier must be greater than 1.0, got {}",
                multiplier
            )));
        }

        if !(0.0..1.0).contains(&randomization_factor) {
            return Err(WaitError::Configuration(format!(
                "randomization_factor must be in [0, 1), got {}",
                randomization_factor
            )));
        }

        if max_elapsed_time.is_some_and(|d| d.is_zero()) {
            return Err(WaitError::Configuration(
                "max_elapsed_time must be greater than zero when set".to_string(),
            ));
        }

        Ok(Self {
            initial_interval,
            max_interval,
            multiplier,
            randomization_factor,
            max_elapsed_time,
        })
    }

    pub fn initial_interval(&self) -> Duration {
        self.initial_interval
    }

    pub fn max_interval(&self) -> Option<Duration> {
        self.max_interval
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn randomization_factor(&self) -> f64 {
        self.randomization_factor
    }

    pub fn max_elapsed_time(&self) -> Option<Duration> {
        self.max_elapsed_time
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(INITIAL_INTERVAL_MILLIS),
            max_interval: None,
            multiplier: MULTIPLIER,
            randomization_factor: RANDOMIZATION_FACTOR,
            max_elapsed_time: Some(Duration::from_secs(MAX_ELAPSED_TIME_SECS)),
        }
    }
}
