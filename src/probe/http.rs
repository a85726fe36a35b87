// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! HTTP GET prober.

use super::Prober;
use crate::constants::content_type::{
    ALLOWED_CHARSETS, JSON, SAML_METADATA_PREFIX, TEXT_PREFIX,
};
use crate::constants::probe::{ATTEMPT_TIMEOUT_SECS, MAX_BODY_BYTES};
use crate::error::{Result, WaitError};
use crate::poll::{Attempt, Outcome};
use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Non-fatal finding reported next to a successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub summary: String,
    pub detail: String,
}

/// Response captured by a successful probe.
#[derive(Debug, Clone, Serialize)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
    /// Header names in canonical form, repeated values joined with `", "`
    pub headers: BTreeMap<String, String>,
    pub advisories: Vec<Advisory>,
}

/// Issues one GET per attempt against a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: Url,
    headers: HeaderMap,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpProbe {
    /// Validate the target up front; a bad URL or header is a configuration
    /// error and no request is ever made.
    pub fn new(
        client: reqwest::Client,
        url: &str,
        request_headers: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| WaitError::Configuration(format!("Invalid URL {:?}: {}", url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(WaitError::Configuration(format!(
                "Unsupported URL scheme {:?}, expected http or https",
                url.scheme()
            )));
        }

        let mut headers = HeaderMap::new();
        for (name, value) in request_headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                WaitError::Configuration(format!("Invalid header name {:?}: {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                WaitError::Configuration(format!("Invalid value for header {}: {}", name, e))
            })?;
            headers.insert(name, value);
        }

        Ok(Self {
            client,
            url,
            headers,
            timeout: Duration::from_secs(ATTEMPT_TIMEOUT_SECS),
            max_body_bytes: MAX_BODY_BYTES,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn read_body(&self, mut response: reqwest::Response) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| WaitError::Transport(format!("Error reading response body: {}", describe(&e))))?
        {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(WaitError::PermanentTarget(format!(
                    "Response body from {} exceeds {} bytes",
                    self.url, self.max_body_bytes
                )));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    fn classify_status(&self, status: StatusCode) -> Option<Outcome<HttpResponse>> {
        if status.is_server_error()
            || status == StatusCode::NOT_FOUND
            || status == StatusCode::TOO_MANY_REQUESTS
        {
            return Some(Outcome::Retryable(WaitError::NotYetReady(format!(
                "{} returned HTTP {}",
                self.url, status
            ))));
        }
        if status.is_client_error() {
            return Some(Outcome::Fatal(WaitError::PermanentTarget(format!(
                "{} returned HTTP {}",
                self.url, status
            ))));
        }
        None
    }
}

impl Prober for HttpProbe {
    type Output = HttpResponse;

    #[instrument(skip_all, fields(url = %self.url, attempt = attempt.index))]
    async fn attempt(&self, attempt: &Attempt) -> Outcome<HttpResponse> {
        let response = match self
            .client
            .get(self.url.clone())
            .headers(self.headers.clone())
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return classify_request_error(&e),
        };

        let status = response.status();
        debug!("Received HTTP {}", status);
        if let Some(outcome) = self.classify_status(status) {
            return outcome;
        }

        let headers = project_headers(response.headers());
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .unwrap_or_default();
        let advisories: Vec<Advisory> = content_type_advisory(&content_type).into_iter().collect();
        for advisory in &advisories {
            warn!("{}", advisory.summary);
        }

        match self.read_body(response).await {
            Ok(body) => Outcome::Success(HttpResponse {
                status_code: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
                headers,
                advisories,
            }),
            Err(e) => Outcome::from_error(e),
        }
    }
}

fn classify_request_error(error: &reqwest::Error) -> Outcome<HttpResponse> {
    if error.is_builder() {
        return Outcome::Fatal(WaitError::Configuration(format!(
            "Error creating request: {}",
            describe(error)
        )));
    }
    if error.is_redirect() {
        return Outcome::Fatal(WaitError::PermanentTarget(format!(
            "Error following redirects: {}",
            describe(error)
        )));
    }
    Outcome::Retryable(WaitError::Transport(format!(
        "Error making request: {}",
        describe(error)
    )))
}

/// Render an error with its source chain; reqwest keeps the useful part
/// (refused, DNS, TLS) in the sources.
fn describe(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Project response headers into one string per field, values joined with
/// `", "` in the order received (RFC 2616 section 4.2).
pub fn project_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .keys()
        .map(|name| {
            let joined = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            (canonical_header_name(name.as_str()), joined)
        })
        .collect()
}

/// `x-double` -> `X-Double`, `content-type` -> `Content-Type`.
pub fn canonical_header_name(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

fn content_type_advisory(content_type: &str) -> Option<Advisory> {
    if is_content_type_text(content_type) {
        return None;
    }
    Some(Advisory {
        summary: format!(
            "Content-Type is not recognized as a text type, got {:?}",
            content_type
        ),
        detail: "If the content is binary data, the response body may not be represented correctly."
            .to_string(),
    })
}

/// Whether a body with this `Content-Type` can be surfaced as text.
pub fn is_content_type_text(content_type: &str) -> bool {
    let Some((media_type, params)) = parse_media_type(content_type) else {
        return false;
    };

    let recognized = media_type.starts_with(TEXT_PREFIX)
        || media_type == JSON
        || media_type.starts_with(SAML_METADATA_PREFIX);
    if !recognized {
        return false;
    }

    let charset = params
        .get("charset")
        .map(|c| c.to_ascii_lowercase())
        .unwrap_or_default();
    ALLOWED_CHARSETS.contains(&charset.as_str())
}

fn parse_media_type(value: &str) -> Option<(String, BTreeMap<String, String>)> {
    let mut parts = value.split(';');
    let media_type = parts.next()?.trim().to_ascii_lowercase();
    let (kind, subtype) = media_type.split_once('/')?;
    if !is_token(kind) || !is_token(subtype) {
        return None;
    }

    let mut params = BTreeMap::new();
    for param in parts.map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = param.split_once('=')?;
        let key = key.trim().to_ascii_lowercase();
        if !is_token(&key) {
            return None;
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        params.insert(key, value.to_string());
    }

    Some((media_type, params))
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?=".contains(c))
}
