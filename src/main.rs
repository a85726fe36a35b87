// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kubewait::config::{Config, Target};
use kubewait::datasource::{HttpDataSource, KubernetesWaitDataSource};
use kubewait::kubernetes::{create_client, infer_client};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, the record to stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting kubewait");

    let config = Config::from_env()?;

    // Ctrl-C cancels the poll in progress
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            trigger.cancel();
        }
    });

    let record = match config.target {
        Target::Http(http) => {
            info!("Waiting for {}", http.url);
            let client = reqwest::Client::builder().build()?;
            let mut source = HttpDataSource::new(client);
            if let Some(timeout) = config.attempt_timeout {
                source = source.with_attempt_timeout(timeout);
            }
            let record = source.read(&http, &cancel).await?;
            for warning in &record.warnings {
                warn!("{}: {}", warning.summary, warning.detail);
            }
            serde_json::to_value(record)?
        }
        Target::Service(service) => {
            info!("Waiting for service {}/{}", service.namespace, service.name);
            let client = match &config.credentials {
                Some(credentials) => create_client(credentials).await?,
                None => infer_client().await?,
            };
            let mut source = KubernetesWaitDataSource::new(client);
            if let Some(timeout) = config.attempt_timeout {
                source = source.with_attempt_timeout(timeout);
            }
            let record = source.read(&service, &cancel).await?;
            serde_json::to_value(record)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
