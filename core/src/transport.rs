//! Blocking `ureq` transport behind the async `ApiClient` seam.
//!
//! Each request runs on tokio's blocking pool. Dropping the returned future
//! does not abort a call already in flight; its result is discarded.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::api::{ApiClient, StoreApi};
use crate::config::Configuration;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// `ApiClient` backed by a shared `ureq::Agent`.
#[derive(Clone)]
pub struct UreqClient {
    agent: ureq::Agent,
}

impl fmt::Debug for UreqClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqClient").finish_non_exhaustive()
    }
}

impl UreqClient {
    /// Error statuses are returned as responses rather than `Err`, so the
    /// store client does all status interpretation.
    pub fn new(config: &Configuration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl ApiClient for UreqClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute(&agent, request))
            .await
            .map_err(|e| ApiError::Transport(format!("blocking task failed: {e}")))?
    }
}

impl StoreApi<UreqClient> {
    /// Proxy wired to a fresh `UreqClient` built from the same configuration.
    pub fn from_config(config: &Configuration) -> Self {
        Self::new(Arc::new(UreqClient::new(config)), config)
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn execute(agent: &ureq::Agent, request: HttpRequest) -> Result<HttpResponse, ApiError> {
    let HttpRequest {
        method,
        path,
        headers,
        body,
    } = request;

    let result = match (method, body) {
        (HttpMethod::Get, _) => with_headers(agent.get(&path), &headers).call(),
        (HttpMethod::Delete, _) => with_headers(agent.delete(&path), &headers).call(),
        (HttpMethod::Post, Some(body)) => {
            with_headers(agent.post(&path), &headers).send(body.as_bytes())
        }
        (HttpMethod::Post, None) => with_headers(agent.post(&path), &headers).send_empty(),
    };

    let mut response = result.map_err(|e| {
        warn!(%method, url = %path, error = %e, "store request failed");
        ApiError::Transport(e.to_string())
    })?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}
