// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{Attempt, Outcome};
use crate::backoff::{BackoffConfig, BackoffPolicy};
use crate::error::WaitError;
use crate::probe::Prober;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Lifecycle of a poll operation. Terminal states have no way out.
///
/// `Idle` and `Attempting` only exist inside [`PollEngine::run`], which
/// consumes the engine; callers observe the terminal state through
/// [`PollResult::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Attempting,
    Succeeded,
    TimedOut,
    Cancelled,
    Failed,
}

/// Terminal result of one poll operation.
#[derive(Debug)]
pub enum PollResult<T> {
    Succeeded {
        value: T,
        attempts: u32,
        elapsed: Duration,
    },
    /// The budget ran out; carries the last retryable error
    TimedOut {
        last_error: WaitError,
        attempts: u32,
        elapsed: Duration,
    },
    Cancelled {
        attempts: u32,
        elapsed: Duration,
    },
    Failed {
        error: WaitError,
        attempts: u32,
    },
}

impl<T> PollResult<T> {
    pub fn state(&self) -> PollState {
        match self {
            PollResult::Succeeded { .. } => PollState::Succeeded,
            PollResult::TimedOut { .. } => PollState::TimedOut,
            PollResult::Cancelled { .. } => PollState::Cancelled,
            PollResult::Failed { .. } => PollState::Failed,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            PollResult::Succeeded { attempts, .. }
            | PollResult::TimedOut { attempts, .. }
            | PollResult::Cancelled { attempts, .. }
            | PollResult::Failed { attempts, .. } => *attempts,
        }
    }

    /// Collapse into a `Result`, turning a timeout into
    /// [`WaitError::BudgetExceeded`] and a cancellation into
    /// [`WaitError::Cancelled`].
    pub fn into_result(self) -> crate::error::Result<T> {
        match self {
            PollResult::Succeeded { value, .. } => Ok(value),
            PollResult::TimedOut {
                last_error,
                attempts,
                elapsed,
            } => Err(WaitError::BudgetExceeded {
                last_error: Box::new(last_error),
                attempts,
                elapsed,
            }),
            PollResult::Cancelled { attempts, .. } => Err(WaitError::Cancelled { attempts }),
            PollResult::Failed { error, .. } => Err(error),
        }
    }
}

/// Drives a [`Prober`] until it succeeds, fails fatally, runs out of
/// budget, or is cancelled.
///
/// An engine runs exactly one poll: [`PollEngine::run`] consumes it.
#[derive(Debug)]
pub struct PollEngine {
    policy: BackoffPolicy,
    rng: StdRng,
}

impl PollEngine {
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            policy: BackoffPolicy::new(config),
            rng: StdRng::from_entropy(),
        }
    }

    /// Engine with a deterministic jitter sequence.
    pub fn with_seed(config: BackoffConfig, seed: u64) -> Self {
        Self {
            policy: BackoffPolicy::new(config),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Poll `prober` until a terminal state is reached.
    ///
    /// The first attempt starts immediately. Cancellation is observed both
    /// while an attempt is in flight (the attempt future is dropped) and
    /// during the wait between attempts. A wait never extends past the
    /// remaining budget.
    #[instrument(skip_all)]
    pub async fn run<P: Prober>(
        mut self,
        prober: &P,
        cancel: &CancellationToken,
    ) -> PollResult<P::Output> {
        let start = Instant::now();
        let mut index: u32 = 0;
        let mut waited = Duration::ZERO;

        debug!(config = ?self.policy.config(), "State {:?} -> {:?}", PollState::Idle, PollState::Attempting);

        loop {
            let attempt = Attempt {
                index,
                elapsed: start.elapsed(),
                waited,
            };
            let attempts = index.saturating_add(1);
            debug!(attempt = attempts, elapsed = ?attempt.elapsed, "Probing target");

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(attempts, "Poll cancelled during attempt");
                    return PollResult::Cancelled { attempts, elapsed: start.elapsed() };
                }
                outcome = prober.attempt(&attempt) => outcome,
            };

            let error = match outcome {
                Outcome::Success(value) => {
                    let elapsed = start.elapsed();
                    info!(attempts, ?elapsed, "Target ready");
                    return PollResult::Succeeded {
                        value,
                        attempts,
                        elapsed,
                    };
                }
                Outcome::Fatal(error) => {
                    warn!(attempts, "Attempt failed permanently: {}", error);
                    return PollResult::Failed { error, attempts };
                }
                Outcome::Retryable(error) => error,
            };

            let elapsed = start.elapsed();
            if self.policy.is_exhausted(elapsed) {
                warn!(attempts, ?elapsed, "Polling budget exhausted: {}", error);
                return PollResult::TimedOut {
                    last_error: error,
                    attempts,
                    elapsed,
                };
            }

            let mut wait = self.policy.next_interval(index, &mut self.rng);
            if let Some(budget) = self.policy.config().max_elapsed_time() {
                wait = wait.min(budget.saturating_sub(elapsed));
            }
            info!(attempts, "Target not ready: {}, retrying in {:?}", error, wait);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(attempts, "Poll cancelled while waiting");
                    return PollResult::Cancelled { attempts, elapsed: start.elapsed() };
                }
                _ = sleep(wait) => {}
            }

            waited = wait;
            index = attempts;
        }
    }
}
