// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::WaitError;
use std::time::Duration;

/// Position of one probe call within a poll operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    /// 0-based attempt index
    pub index: u32,
    /// Time since the first attempt started
    pub elapsed: Duration,
    /// Interval waited before this attempt, zero for the first
    pub waited: Duration,
}

impl Attempt {
    pub fn first() -> Self {
        Self {
            index: 0,
            elapsed: Duration::ZERO,
            waited: Duration::ZERO,
        }
    }
}

/// Classified result of a single probe call.
#[derive(Debug)]
pub enum Outcome<T> {
    Success(T),
    /// Transient, worth another attempt while budget remains
    Retryable(WaitError),
    /// Retrying cannot help
    Fatal(WaitError),
}

impl<T> Outcome<T> {
    /// Classify an error by its kind: transport and not-ready errors retry,
    /// everything else is fatal.
    pub fn from_error(error: WaitError) -> Self {
        if error.is_retryable() {
            Outcome::Retryable(error)
        } else {
            Outcome::Fatal(error)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}
