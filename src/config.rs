// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::backoff::BackoffSettings;
use crate::datasource::{HttpDataSourceConfig, KubernetesWaitConfig};
use crate::kubernetes::ClusterCredentials;
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// What a single run waits for
#[derive(Debug, Clone)]
pub enum Target {
    Http(HttpDataSourceConfig),
    Service(KubernetesWaitConfig),
}

/// Run configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub target: Target,
    /// Explicit cluster credentials; the ambient kubeconfig is used when absent
    pub credentials: Option<ClusterCredentials>,
    /// Per-attempt timeout override for the prober
    pub attempt_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backoff = BackoffSettings {
            initial_interval: parse_var(&lookup, "WAIT_INITIAL_INTERVAL_MS")?,
            max_elapsed_time: parse_var(&lookup, "WAIT_MAX_ELAPSED_TIME_SECS")?,
            randomization_factor: parse_var(&lookup, "WAIT_RANDOMIZATION_FACTOR")?,
            multiplier: parse_var(&lookup, "WAIT_MULTIPLIER")?,
            max_interval: parse_var(&lookup, "WAIT_MAX_INTERVAL_MS")?,
        };

        let attempt_timeout = match parse_var::<_, u64>(&lookup, "WAIT_ATTEMPT_TIMEOUT_SECS")? {
            Some(0) => bail!("WAIT_ATTEMPT_TIMEOUT_SECS must be greater than zero"),
            secs => secs.map(Duration::from_secs),
        };

        let target = if let Some(url) = lookup("WAIT_URL") {
            let request_headers: BTreeMap<String, String> = match lookup("WAIT_REQUEST_HEADERS") {
                Some(raw) => serde_json::from_str(&raw)
                    .context("WAIT_REQUEST_HEADERS must be a JSON object of strings")?,
                None => BTreeMap::new(),
            };
            Target::Http(HttpDataSourceConfig {
                url,
                request_headers,
                backoff,
            })
        } else {
            let namespace = lookup("WAIT_NAMESPACE")
                .context("WAIT_NAMESPACE environment variable not set (or set WAIT_URL)")?;
            let name = lookup("WAIT_NAME")
                .context("WAIT_NAME environment variable not set (or set WAIT_URL)")?;
            Target::Service(KubernetesWaitConfig {
                namespace,
                name,
                backoff,
            })
        };

        let credentials = match (
            lookup("KUBE_HOST"),
            lookup("KUBE_CA_CERT"),
            lookup("KUBE_TOKEN"),
        ) {
            (None, None, None) => None,
            (Some(host), Some(cluster_ca_certificate), Some(token)) => Some(ClusterCredentials {
                host,
                cluster_ca_certificate,
                token,
            }),
            _ => bail!("KUBE_HOST, KUBE_CA_CERT and KUBE_TOKEN must be set together"),
        };

        Ok(Config {
            target,
            credentials,
            attempt_timeout,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value for {}: {:?}", key, raw))
        })
        .transpose()
}
