// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Retry-until-ready polling: attempt outcomes and the engine driving them.

mod engine;
mod outcome;

pub use engine::{PollEngine, PollResult, PollState};
pub use outcome::{Attempt, Outcome};
