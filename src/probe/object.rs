// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster-object prober: looks up one named object in one namespace.

use super::Prober;
use crate::constants::probe::ATTEMPT_TIMEOUT_SECS;
use crate::error::{Result, WaitError};
use crate::poll::{Attempt, Outcome};
use k8s_openapi::NamespaceResourceScope;
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, instrument};

/// Polls for the existence of a namespaced object of kind `K`.
#[derive(Clone)]
pub struct ObjectProbe<K> {
    api: Api<K>,
    namespace: String,
    name: String,
    timeout: Duration,
}

impl<K> ObjectProbe<K>
where
    K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
    K::DynamicType: Default,
{
    /// Malformed namespace or object names are rejected here, before any
    /// lookup is attempted.
    pub fn new(client: Client, namespace: &str, name: &str) -> Result<Self> {
        if !is_dns_label(namespace) {
            return Err(WaitError::Configuration(format!(
                "Invalid namespace {:?}: must be a lowercase RFC 1123 label",
                namespace
            )));
        }
        if !is_dns_subdomain(name) {
            return Err(WaitError::Configuration(format!(
                "Invalid object name {:?}: must be a lowercase RFC 1123 subdomain",
                name
            )));
        }

        Ok(Self {
            api: Api::namespaced(client, namespace),
            namespace: namespace.to_string(),
            name: name.to_string(),
            timeout: Duration::from_secs(ATTEMPT_TIMEOUT_SECS),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `namespace/name` of the object being waited for.
    pub fn target(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl<K> Prober for ObjectProbe<K>
where
    K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug + Send + Sync,
    K::DynamicType: Default,
{
    type Output = K;

    #[instrument(skip_all, fields(object = %self.target(), attempt = attempt.index))]
    async fn attempt(&self, attempt: &Attempt) -> Outcome<K> {
        match timeout(self.timeout, self.api.get(&self.name)).await {
            Ok(Ok(object)) => {
                debug!("Object found");
                Outcome::Success(object)
            }
            Ok(Err(e)) => classify_kube_error(e, &self.target()),
            Err(_) => Outcome::Retryable(WaitError::Transport(format!(
                "Lookup of {} timed out after {:?}",
                self.target(),
                self.timeout
            ))),
        }
    }
}

/// Classify a failed lookup. Missing objects and transient server or
/// connectivity errors retry; every other API rejection is final.
pub fn classify_kube_error<T>(error: kube::Error, target: &str) -> Outcome<T> {
    match &error {
        kube::Error::Api(response) if response.code == 404 => {
            Outcome::Retryable(WaitError::NotYetReady(format!("{} not found", target)))
        }
        kube::Error::Api(response) if matches!(response.code, 429 | 500 | 502 | 503 | 504) => {
            Outcome::Retryable(WaitError::Transport(format!(
                "Lookup of {} failed: {} ({})",
                target, response.message, response.code
            )))
        }
        kube::Error::Api(response) => Outcome::Fatal(WaitError::PermanentTarget(format!(
            "Lookup of {} rejected: {} ({})",
            target, response.message, response.code
        ))),
        kube::Error::SerdeError(_) | kube::Error::BuildRequest(_) => {
            Outcome::Fatal(WaitError::PermanentTarget(format!(
                "Lookup of {} failed: {}",
                target, error
            )))
        }
        _ => Outcome::Retryable(WaitError::Transport(format!(
            "Lookup of {} failed: {}",
            target, error
        ))),
    }
}

fn is_dns_label(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 63
        && s.bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !s.starts_with('-')
        && !s.ends_with('-')
}

fn is_dns_subdomain(s: &str) -> bool {
    s.len() <= 253 && s.split('.').all(is_dns_label)
}
