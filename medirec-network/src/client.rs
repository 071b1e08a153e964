//! Shared HTTP plumbing used by both runtime implementations.

use crate::error::{NetworkError, NetworkResult};
use crate::retry::RetryPolicy;
use crate::{NetworkConfig, RequestOptions};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Timeout for the lightweight connectivity probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) struct HttpContext {
    client: Client,
    config: NetworkConfig,
}

impl HttpContext {
    pub(crate) fn new(config: NetworkConfig) -> Self {
        let client = Client::builder()
            .build()
            .expect("failed to create HTTP client");
        Self { client, config }
    }

    fn full_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}{url}", self.config.base_url)
        }
    }

    /// Sends one attempt of a request and classifies the outcome.
    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> NetworkResult<Value> {
        let mut request = self
            .client
            .request(method.clone(), self.full_url(url))
            .timeout(options.timeout)
            .header("Content-Type", "application/json");

        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }
        for (name, value) in &options.headers {
            request = request.header(name, value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();

        if !(200..300).contains(&status) {
            let body = response.json::<Value>().await.ok();
            return Err(NetworkError::from_status(status, body));
        }

        // 204s and empty bodies decode as null rather than failing.
        let text = response
            .text()
            .await
            .map_err(|e| NetworkError::Unknown(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| NetworkError::Unknown(format!("invalid JSON response: {e}")))
    }

    /// Runs a request under the retry policy derived from `options`.
    pub(crate) async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> NetworkResult<Value> {
        let policy = RetryPolicy {
            retries: options.retries,
            initial_delay: self.config.initial_retry_delay,
        };
        debug!(%method, url, "dispatching request");
        policy
            .run(|| self.send_once(&method, url, body.as_ref(), &options))
            .await
    }

    /// Short-timeout HEAD probe against the configured health path.
    /// Any failure counts as offline.
    pub(crate) async fn probe(&self) -> bool {
        let mut request = self
            .client
            .head(self.full_url(&self.config.health_path))
            .timeout(PROBE_TIMEOUT);
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "connectivity probe failed");
                false
            }
        }
    }
}
