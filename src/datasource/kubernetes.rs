// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The `kubernetes-wait` data source: wait for a Service to exist.

use crate::backoff::BackoffSettings;
use crate::constants::probe::ATTEMPT_TIMEOUT_SECS;
use crate::error::Result;
use crate::poll::PollEngine;
use crate::probe::ObjectProbe;
use k8s_openapi::api::core::v1::Service;
use kube::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KubernetesWaitConfig {
    pub namespace: String,
    pub name: String,
    #[serde(flatten)]
    pub backoff: BackoffSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KubernetesWaitRecord {
    /// `namespace/name`
    pub id: String,
    pub namespace: String,
    pub name: String,
    pub exists: bool,
}

/// Reads through the shared cluster client.
#[derive(Clone)]
pub struct KubernetesWaitDataSource {
    client: Client,
    attempt_timeout: Duration,
}

impl KubernetesWaitDataSource {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            attempt_timeout: Duration::from_secs(ATTEMPT_TIMEOUT_SECS),
        }
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    #[instrument(skip_all, fields(service = %format!("{}/{}", config.namespace, config.name)))]
    pub async fn read(
        &self,
        config: &KubernetesWaitConfig,
        cancel: &CancellationToken,
    ) -> Result<KubernetesWaitRecord> {
        let backoff = config.backoff.resolve()?;
        let probe =
            ObjectProbe::<Service>::new(self.client.clone(), &config.namespace, &config.name)?
                .with_timeout(self.attempt_timeout);

        info!(
            "Backoff configuration: {}",
            serde_json::to_string(&backoff).unwrap_or_default()
        );

        PollEngine::new(backoff)
            .run(&probe, cancel)
            .await
            .into_result()?;

        Ok(KubernetesWaitRecord {
            id: probe.target(),
            namespace: config.namespace.clone(),
            name: config.name.clone(),
            exists: true,
        })
    }
}
