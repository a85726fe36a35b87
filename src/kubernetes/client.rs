// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster client creation from explicit credentials

use crate::error::{Result, WaitError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use serde::Deserialize;
use std::fmt;
use std::io::BufReader;
use tracing::{info, instrument};

const CONTEXT_NAME: &str = "kubewait";

/// Endpoint and credentials for the cluster holding the objects to wait for.
#[derive(Clone, Deserialize)]
pub struct ClusterCredentials {
    /// API server URL; `https://` is assumed when no scheme is given
    pub host: String,
    /// PEM-encoded root certificates bundle for TLS authentication
    pub cluster_ca_certificate: String,
    /// Bearer token
    pub token: String,
}

impl fmt::Debug for ClusterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterCredentials")
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl ClusterCredentials {
    /// Check the fields before any connection is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(WaitError::Configuration(
                "Host cannot be an empty string".to_string(),
            ));
        }
        parse_ca_bundle(&self.cluster_ca_certificate)?;
        if self.token.trim().is_empty() {
            return Err(WaitError::Configuration(
                "Token cannot be an empty string".to_string(),
            ));
        }
        Ok(())
    }

    fn server_url(&self) -> String {
        let host = self.host.trim();
        if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }

    /// Render a single-context kubeconfig for these credentials.
    pub fn to_kubeconfig(&self) -> Result<String> {
        let kubeconfig = serde_json::json!({
            "apiVersion": "v1",
            "kind": "Config",
            "clusters": [{
                "name": CONTEXT_NAME,
                "cluster": {
                    "server": self.server_url(),
                    "certificate-authority-data": STANDARD.encode(self.cluster_ca_certificate.trim()),
                },
            }],
            "users": [{
                "name": CONTEXT_NAME,
                "user": { "token": self.token.trim() },
            }],
            "contexts": [{
                "name": CONTEXT_NAME,
                "context": { "cluster": CONTEXT_NAME, "user": CONTEXT_NAME },
            }],
            "current-context": CONTEXT_NAME,
        });

        serde_yaml::to_string(&kubeconfig)
            .map_err(|e| WaitError::Configuration(format!("Failed to render kubeconfig: {}", e)))
    }
}

/// Create the shared cluster client. Built once and only read afterwards.
#[instrument(skip(credentials), fields(host = %credentials.host))]
pub async fn create_client(credentials: &ClusterCredentials) -> Result<Client> {
    credentials.validate()?;
    let client = create_client_from_kubeconfig(&credentials.to_kubeconfig()?).await?;
    info!("Created Kubernetes client");
    Ok(client)
}

/// Create a client from the ambient environment (in-cluster or `KUBECONFIG`).
pub async fn infer_client() -> Result<Client> {
    Client::try_default()
        .await
        .map_err(|e| WaitError::Configuration(format!("Failed to infer config: {}", e)))
}

/// Create a Kubernetes client from a kubeconfig string
async fn create_client_from_kubeconfig(kubeconfig: &str) -> Result<Client> {
    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| WaitError::Configuration(format!("Failed to parse kubeconfig: {}", e)))?;

    let client_config =
        kube::Config::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
            .await
            .map_err(|e| WaitError::Configuration(format!("Failed to create config: {}", e)))?;

    Client::try_from(client_config)
        .map_err(|e| WaitError::Configuration(format!("Failed to create client: {}", e)))
}

/// Decode every `CERTIFICATE` block in the bundle; returns how many were found.
fn parse_ca_bundle(pem: &str) -> Result<usize> {
    let invalid = |reason: String| {
        WaitError::Configuration(format!(
            "'cluster_ca_certificate' is not a valid PEM encoded certificate: {}",
            reason
        ))
    };

    let mut root_certs_reader = BufReader::new(pem.as_bytes());
    let mut count = 0;
    for cert in rustls_pemfile::certs(&mut root_certs_reader) {
        let cert = cert.map_err(|e| invalid(e.to_string()))?;
        if cert.is_empty() {
            return Err(invalid("empty certificate block".to_string()));
        }
        count += 1;
    }

    if count == 0 {
        return Err(invalid("no certificate found".to_string()));
    }
    Ok(count)
}
