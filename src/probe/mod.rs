// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Single-attempt probes against external targets.
//!
//! A prober performs exactly one read-only check per call and classifies
//! the result. It never retries on its own; retry decisions belong to the
//! [`PollEngine`](crate::poll::PollEngine). Every prober bounds its own
//! call with a per-attempt timeout.

pub mod http;
pub mod object;

pub use http::{Advisory, HttpProbe, HttpResponse};
pub use object::ObjectProbe;

use crate::poll::{Attempt, Outcome};
use std::future::Future;

/// Capability to run one probe attempt.
pub trait Prober {
    type Output: Send;

    fn attempt(&self, attempt: &Attempt) -> impl Future<Output = Outcome<Self::Output>> + Send;
}
