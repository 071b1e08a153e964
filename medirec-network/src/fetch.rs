//! Web-runtime network service.
//!
//! Mirrors the browser fetch stack: the embedding shell maintains an
//! online hint (the `navigator.onLine` equivalent), and connectivity
//! checks consult it before spending a probe on the wire.

use crate::client::HttpContext;
use crate::error::NetworkResult;
use crate::{NetworkConfig, NetworkService, RequestOptions};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Fetch-style HTTP client for the browser runtime.
pub struct FetchNetworkService {
    http: HttpContext,
    online_hint: Arc<AtomicBool>,
}

impl FetchNetworkService {
    /// Creates the service with an optimistic online hint.
    #[must_use]
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            http: HttpContext::new(config),
            online_hint: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Handle the embedding shell uses to report link state changes.
    #[must_use]
    pub fn online_hint(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.online_hint)
    }
}

#[async_trait]
impl NetworkService for FetchNetworkService {
    fn name(&self) -> &'static str {
        "fetch-http"
    }

    async fn get(&self, url: &str, options: RequestOptions) -> NetworkResult<Value> {
        self.http.execute(Method::GET, url, None, options).await
    }

    async fn post(
        &self,
        url: &str,
        body: &Value,
        options: RequestOptions,
    ) -> NetworkResult<Value> {
        self.http
            .execute(Method::POST, url, Some(body.clone()), options)
            .await
    }

    async fn patch(
        &self,
        url: &str,
        body: &Value,
        options: RequestOptions,
    ) -> NetworkResult<Value> {
        self.http
            .execute(Method::PATCH, url, Some(body.clone()), options)
            .await
    }

    async fn delete(&self, url: &str, options: RequestOptions) -> NetworkResult<Value> {
        self.http.execute(Method::DELETE, url, None, options).await
    }

    async fn check_connectivity(&self) -> bool {
        if !self.online_hint.load(Ordering::Relaxed) {
            debug!("shell reports offline, skipping probe");
            return false;
        }
        self.http.probe().await
    }
}
