//! HTTP layer for the medirec offline runtime.
//!
//! Defines the [`NetworkService`] contract every runtime provides, a typed
//! error taxonomy, and the retry/backoff policy shared by the two
//! implementations:
//! - [`BridgeNetworkService`]: the desktop bridge's HTTP stack
//! - [`FetchNetworkService`]: fetch-semantics client for the browser
//!   runtime, with the shell's online hint gating connectivity checks
//!
//! Only timeouts, connection failures and 5xx responses are retried;
//! authentication and other client errors surface immediately.

mod bridge;
mod client;
mod error;
mod fetch;
mod retry;

pub use bridge::BridgeNetworkService;
pub use error::{NetworkError, NetworkResult};
pub use fetch::FetchNetworkService;
pub use retry::{RetryPolicy, DEFAULT_INITIAL_DELAY, DEFAULT_RETRIES};

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-request options.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// How long one attempt may take before it is aborted as a timeout.
    pub timeout: Duration,
    /// Total attempts for this request.
    pub retries: u32,
    /// Extra headers, applied after the standard ones.
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retries: retry::DEFAULT_RETRIES,
            headers: Vec::new(),
        }
    }
}

/// Configuration shared by both network implementations.
#[derive(Debug, Clone, Default)]
pub struct NetworkConfig {
    /// Server origin; relative request URLs are joined onto it.
    pub base_url: String,
    /// Bearer token sent as `Authorization` on every call, when present.
    pub auth_token: Option<String>,
    /// Path probed by `check_connectivity`.
    pub health_path: String,
    /// Delay before the first retry. Doubles per retry.
    pub initial_retry_delay: Duration,
}

impl NetworkConfig {
    /// Creates a config with the standard probe path and backoff.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            health_path: "/api/health".to_string(),
            initial_retry_delay: retry::DEFAULT_INITIAL_DELAY,
        }
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

/// Abstract HTTP interface.
///
/// Implementations share no mutable state across in-flight calls beyond
/// the per-call timeout, so concurrent requests are safe.
#[async_trait]
pub trait NetworkService: Send + Sync {
    /// Returns the name of the network implementation.
    fn name(&self) -> &'static str;

    /// GET a JSON resource.
    async fn get(&self, url: &str, options: RequestOptions) -> NetworkResult<Value>;

    /// POST a JSON body.
    async fn post(&self, url: &str, body: &Value, options: RequestOptions)
        -> NetworkResult<Value>;

    /// PATCH a JSON body.
    async fn patch(
        &self,
        url: &str,
        body: &Value,
        options: RequestOptions,
    ) -> NetworkResult<Value>;

    /// DELETE a resource.
    async fn delete(&self, url: &str, options: RequestOptions) -> NetworkResult<Value>;

    /// Whether the server is reachable right now. Never errors; any
    /// failure is reported as `false`.
    async fn check_connectivity(&self) -> bool;
}
