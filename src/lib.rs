// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod backoff;
pub mod config;
pub mod constants;
pub mod datasource;
pub mod error;
pub mod kubernetes;
pub mod poll;
pub mod probe;

#[cfg(test)]
pub(crate) mod test_utils;
