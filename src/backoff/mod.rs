// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Exponential backoff configuration and interval computation.
//!
//! [`BackoffSettings`] is the raw, optional form supplied by callers;
//! resolving it yields a validated [`BackoffConfig`] that a
//! [`BackoffPolicy`] turns into a jittered sequence of waits.

mod policy;
mod settings;

pub use policy::BackoffPolicy;
pub use settings::{BackoffConfig, BackoffSettings};
