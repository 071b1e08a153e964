//! Native-runtime network service.
//!
//! The desktop bridge owns a real HTTP stack, so requests go straight out
//! through a shared client and connectivity is established by probing.

use crate::client::HttpContext;
use crate::error::NetworkResult;
use crate::{NetworkConfig, NetworkService, RequestOptions};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

/// HTTP client backed by the native desktop bridge.
pub struct BridgeNetworkService {
    http: HttpContext,
}

impl BridgeNetworkService {
    /// Creates the service. Never blocks and performs no I/O.
    #[must_use]
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            http: HttpContext::new(config),
        }
    }
}

#[async_trait]
impl NetworkService for BridgeNetworkService {
    fn name(&self) -> &'static str {
        "bridge-http"
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
        self.http.probe().await
    }
}
