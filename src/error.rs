// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WaitError {
    /// Invalid backoff parameters or a malformed target descriptor.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Connection, DNS or TLS failure, or the cluster API being unreachable.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The target answered but is not there (yet).
    #[error("Target not ready: {0}")]
    NotYetReady(String),

    /// Authorization failures, malformed identifiers, rejected requests.
    #[error("Permanent target error: {0}")]
    PermanentTarget(String),

    #[error("Gave up after {attempts} attempts in {elapsed:?}: {last_error}")]
    BudgetExceeded {
        last_error: Box<WaitError>,
        attempts: u32,
        elapsed: Duration,
    },

    #[error("Cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

impl WaitError {
    /// Whether a prober reporting this error should be tried again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WaitError::Transport(_) | WaitError::NotYetReady(_))
    }
}

pub type Result<T> = std::result::Result<T, WaitError>;
