// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use super::BackoffConfig;
use rand::Rng;
use std::time::Duration;

/// Computes the wait before each retry from a [`BackoffConfig`].
///
/// The policy holds no attempt counter; callers pass the attempt index and
/// a random source, so a seeded RNG gives a reproducible sequence.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    config: BackoffConfig,
}

impl BackoffPolicy {
    pub fn new(config: BackoffConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BackoffConfig {
        &self.config
    }

    /// Interval before jitter: `initial * multiplier^attempt`, capped at `max_interval`.
    pub fn base_interval(&self, attempt: u32) -> Duration {
        secs_to_duration(self.base_secs(attempt))
    }

    /// Jittered interval to wait after the failed attempt `attempt` (0-based).
    pub fn next_interval<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let base = self.base_secs(attempt);
        let factor = self.config.randomization_factor();
        if factor == 0.0 || !base.is_finite() {
            return secs_to_duration(base);
        }

        // Unit-range sample: a range of `±factor * base` overflows f64 for huge bases
        let jitter = factor * rng.gen_range(-1.0..=1.0);
        let mut secs = (base * (1.0 + jitter)).max(0.0);
        if let Some(max) = self.config.max_interval() {
            secs = secs.min(max.as_secs_f64());
        }
        secs_to_duration(secs)
    }

    /// True once `elapsed` has reached the total budget. Never true without one.
    pub fn is_exhausted(&self, elapsed: Duration) -> bool {
        self.config
            .max_elapsed_time()
            .is_some_and(|budget| elapsed >= budget)
    }

    fn base_secs(&self, attempt: u32) -> f64 {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.config.initial_interval().as_secs_f64()
            * self.config.multiplier().powi(exponent);
        match self.config.max_interval() {
            Some(max) => secs.min(max.as_secs_f64()),
            None => secs,
        }
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}
