// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Exponential backoff defaults, in the units of the external settings.
pub mod backoff {
    /// Wait before the first retry, in milliseconds
    pub const INITIAL_INTERVAL_MILLIS: u64 = 500;
    /// Total polling budget, in seconds (15 minutes)
    pub const MAX_ELAPSED_TIME_SECS: u64 = 900;
    /// Jitter fraction: the wait lands between 50% below and 50% above the interval
    pub const RANDOMIZATION_FACTOR: f64 = 0.5;
    /// Growth factor per attempt
    pub const MULTIPLIER: f64 = 1.5;
}

/// Limits applied by the probers to a single attempt.
pub mod probe {
    /// Per-attempt timeout for one HTTP GET or one object lookup, in seconds
    pub const ATTEMPT_TIMEOUT_SECS: u64 = 30;
    /// Largest response body the HTTP prober will buffer (10 MiB)
    pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
}

/// Media types whose bodies can be surfaced as text without a warning.
pub mod content_type {
    pub const TEXT_PREFIX: &str = "text/";
    pub const JSON: &str = "application/json";
    pub const SAML_METADATA_PREFIX: &str = "application/samlmetadata+xml";
    pub const ALLOWED_CHARSETS: &[&str] = &["", "utf-8", "us-ascii"];
}
