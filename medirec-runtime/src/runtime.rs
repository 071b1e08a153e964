//! Service factory for the detected environment.

use crate::environment::Environment;
use medirec_network::{BridgeNetworkService, FetchNetworkService, NetworkConfig, NetworkService};
use medirec_storage::{NativeStorage, StorageService, WebStorage};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Configuration the factory hands to the services it constructs.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Network configuration (base URL, bearer token, probe path).
    pub network: NetworkConfig,
    /// Data directory for the native file-backed store.
    pub data_dir: PathBuf,
}

impl RuntimeConfig {
    #[must_use]
    pub fn new(network: NetworkConfig, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            network,
            data_dir: data_dir.into(),
        }
    }
}

/// Explicit, resettable runtime context.
///
/// Detects the environment once, then lazily constructs and memoizes
/// exactly one storage and one network service for it. Constructing a
/// service never blocks and performs no I/O, so the first `*_service()`
/// call is as cheap as the rest.
pub struct RuntimeService {
    config: RuntimeConfig,
    environment: Mutex<Environment>,
    /// When false, `reset_services` keeps the injected environment
    /// instead of re-running detection.
    detect_on_reset: bool,
    storage: Mutex<Option<Arc<dyn StorageService>>>,
    network: Mutex<Option<Arc<dyn NetworkService>>>,
}

impl RuntimeService {
    /// Creates a runtime context by detecting the environment.
    #[must_use]
    pub fn new(config: RuntimeConfig) -> Self {
        let environment = Environment::detect();
        debug!(%environment, "runtime environment detected");
        Self {
            config,
            environment: Mutex::new(environment),
            detect_on_reset: true,
            storage: Mutex::new(None),
            network: Mutex::new(None),
        }
    }

    /// Creates a runtime context pinned to a known environment. Used by
    /// tests and by shells that already know what they are.
    #[must_use]
    pub fn with_environment(environment: Environment, config: RuntimeConfig) -> Self {
        Self {
            config,
            environment: Mutex::new(environment),
            detect_on_reset: false,
            storage: Mutex::new(None),
            network: Mutex::new(None),
        }
    }

    /// The environment this context is serving.
    #[must_use]
    pub fn environment(&self) -> Environment {
        *self.environment.lock().unwrap()
    }

    /// Whether the native bridge is present.
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.environment() == Environment::Native
    }

    /// Whether this is the browser runtime.
    #[must_use]
    pub fn is_web(&self) -> bool {
        self.environment() == Environment::Web
    }

    /// The storage service for the current environment. Constructed on
    /// first call, then memoized: every call returns the identical `Arc`.
    pub fn storage_service(&self) -> Arc<dyn StorageService> {
        let mut slot = self.storage.lock().unwrap();
        if let Some(service) = slot.as_ref() {
            return Arc::clone(service);
        }

        let service: Arc<dyn StorageService> = match self.environment() {
            Environment::Native => Arc::new(NativeStorage::new(&self.config.data_dir)),
            Environment::Web => Arc::new(WebStorage::new()),
        };
        debug!(name = service.name(), "constructed storage service");
        *slot = Some(Arc::clone(&service));
        service
    }

    /// The network service for the current environment, memoized the same
    /// way as [`storage_service`](Self::storage_service).
    pub fn network_service(&self) -> Arc<dyn NetworkService> {
        let mut slot = self.network.lock().unwrap();
        if let Some(service) = slot.as_ref() {
            return Arc::clone(service);
        }

        let service: Arc<dyn NetworkService> = match self.environment() {
            Environment::Native => {
                Arc::new(BridgeNetworkService::new(self.config.network.clone()))
            }
            Environment::Web => Arc::new(FetchNetworkService::new(self.config.network.clone())),
        };
        debug!(name = service.name(), "constructed network service");
        *slot = Some(Arc::clone(&service));
        service
    }

    /// Drops the memoized services and re-runs detection. Subsequent
    /// `*_service()` calls construct fresh instances; with an unchanged
    /// environment they are of the same concrete types as before.
    pub fn reset_services(&self) {
        if self.detect_on_reset {
            let environment = Environment::detect();
            debug!(%environment, "runtime environment re-detected");
            *self.environment.lock().unwrap() = environment;
        }
        *self.storage.lock().unwrap() = None;
        *self.network.lock().unwrap() = None;
    }
}
