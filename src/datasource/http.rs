// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The `http` data source: wait for a URL to answer, then export the response.

use crate::backoff::BackoffSettings;
use crate::constants::probe::ATTEMPT_TIMEOUT_SECS;
use crate::error::Result;
use crate::poll::PollEngine;
use crate::probe::{Advisory, HttpProbe};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpDataSourceConfig {
    /// Target URL; `http` and `https` are supported
    pub url: String,
    #[serde(default)]
    pub request_headers: BTreeMap<String, String>,
    #[serde(flatten)]
    pub backoff: BackoffSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct HttpRecord {
    /// Same as the URL
    pub id: String,
    pub url: String,
    pub status_code: u16,
    pub response_body: String,
    pub response_headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Advisory>,
}

/// Reads through one shared HTTP client.
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    client: reqwest::Client,
    attempt_timeout: Duration,
}

impl HttpDataSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            attempt_timeout: Duration::from_secs(ATTEMPT_TIMEOUT_SECS),
        }
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    #[instrument(skip_all, fields(url = %config.url))]
    pub async fn read(
        &self,
        config: &HttpDataSourceConfig,
        cancel: &CancellationToken,
    ) -> Result<HttpRecord> {
        let backoff = config.backoff.resolve()?;
        let probe = HttpProbe::new(self.client.clone(), &config.url, &config.request_headers)?
            .with_timeout(self.attempt_timeout);

        info!(
            "Backoff configuration: {}",
            serde_json::to_string(&backoff).unwrap_or_default()
        );

        let response = PollEngine::new(backoff)
            .run(&probe, cancel)
            .await
            .into_result()?;

        Ok(HttpRecord {
            id: config.url.clone(),
            url: config.url.clone(),
            status_code: response.status_code,
            response_body: response.body,
            response_headers: response.headers,
            warnings: response.advisories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WaitError;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(url: String) -> HttpDataSourceConfig {
        HttpDataSourceConfig {
            url,
            request_headers: BTreeMap::new(),
            backoff: BackoffSettings {
                initial_interval: Some(10),
                max_elapsed_time: Some(5),
                max_interval: Some(50),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_read_waits_until_endpoint_is_up() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"{"ready":true}"#, "application/json"),
            )
            .mount(&server)
            .await;
        let url = format!("{}/healthz", server.uri());

        let record = HttpDataSource::new(reqwest::Client::new())
            .read(&config(url.clone()), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(record.id, url);
        assert_eq!(record.status_code, 200);
        assert_eq!(record.response_body, r#"{"ready":true}"#);
        assert_eq!(
            record.response_headers.get("Content-Type").unwrap(),
            "application/json"
        );
        assert!(record.warnings.is_empty());
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_read_gives_up_when_budget_runs_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        let mut config = config(server.uri());
        config.backoff.max_elapsed_time = Some(1);

        let err = HttpDataSource::new(reqwest::Client::new())
            .read(&config, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            WaitError::BudgetExceeded {
                last_error,
                attempts,
                elapsed,
            } => {
                assert!(matches!(*last_error, WaitError::NotYetReady(_)));
                assert!(attempts >= 2);
                assert!(elapsed >= Duration::from_secs(1));
            }
            other => panic!("expected budget exceeded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_endpoint_hits_attempt_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
            .mount(&server)
            .await;
        let mut config = config(server.uri());
        config.backoff.max_elapsed_time = Some(1);

        let err = HttpDataSource::new(reqwest::Client::new())
            .with_attempt_timeout(Duration::from_millis(100))
            .read(&config, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            WaitError::BudgetExceeded {
                last_error,
                attempts,
                elapsed,
            } => {
                assert!(matches!(*last_error, WaitError::Transport(_)));
                assert!(attempts >= 2);
                assert!(elapsed < Duration::from_secs(10));
            }
            other => panic!("expected budget exceeded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_settings_fail_before_any_request() {
        let server = MockServer::start().await;
        let mut config = config(server.uri());
        config.backoff.multiplier = Some(0.5);

        let err = HttpDataSource::new(reqwest::Client::new())
            .read(&config, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, WaitError::Configuration(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_read() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = HttpDataSource::new(reqwest::Client::new())
            .read(&config(server.uri()), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, WaitError::Cancelled { attempts: 1 }));
    }

    #[test]
    fn test_config_deserializes_flat_backoff_fields() {
        let config: HttpDataSourceConfig = serde_json::from_value(serde_json::json!({
            "url": "https://example.com",
            "request_headers": {"Accept": "application/json"},
            "initial_interval": 100,
            "max_elapsed_time": 0
        }))
        .unwrap();

        assert_eq!(config.request_headers.get("Accept").unwrap(), "application/json");
        assert_eq!(config.backoff.initial_interval, Some(100));
        assert_eq!(config.backoff.max_elapsed_time, Some(0));
        assert_eq!(config.backoff.multiplier, None);
    }
}
