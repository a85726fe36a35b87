// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Data sources: one poll operation per read, projected into a flat record.

pub mod http;
pub mod kubernetes;

pub use self::http::{HttpDataSource, HttpDataSourceConfig, HttpRecord};
pub use self::kubernetes::{KubernetesWaitConfig, KubernetesWaitDataSource, KubernetesWaitRecord};
