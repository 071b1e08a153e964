use medirec_network::NetworkConfig;
use medirec_runtime::{Environment, RuntimeConfig, RuntimeService, BRIDGE_MARKER_ENV};
use serial_test::serial;
use std::sync::Arc;
use tempfile::TempDir;

fn config(dir: &TempDir) -> RuntimeConfig {
    RuntimeConfig::new(NetworkConfig::new("http://localhost:9"), dir.path())
}

#[test]
fn native_environment_yields_native_services() {
    let dir = TempDir::new().unwrap();
    let runtime = RuntimeService::with_environment(Environment::Native, config(&dir));

    assert!(runtime.is_native());
    assert!(!runtime.is_web());
    assert_eq!(runtime.storage_service().name(), "native-local-store");
    assert_eq!(runtime.network_service().name(), "bridge-http");
}

#[test]
fn web_environment_yields_web_services() {
    let dir = TempDir::new().unwrap();
    let runtime = RuntimeService::with_environment(Environment::Web, config(&dir));

    assert!(runtime.is_web());
    assert_eq!(runtime.storage_service().name(), "web-origin-store");
    assert_eq!(runtime.network_service().name(), "fetch-http");
}

#[test]
fn services_are_memoized_across_many_calls() {
    let dir = TempDir::new().unwrap();
    let runtime = RuntimeService::with_environment(Environment::Native, config(&dir));

    let first = runtime.network_service();
    for _ in 0..100 {
        let again = runtime.network_service();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(again.name(), "bridge-http");
    }

    let storage = runtime.storage_service();
    assert!(Arc::ptr_eq(&storage, &runtime.storage_service()));
}

#[test]
fn reset_produces_fresh_instances_of_the_same_types() {
    let dir = TempDir::new().unwrap();
    let runtime = RuntimeService::with_environment(Environment::Web, config(&dir));

    let storage_before = runtime.storage_service();
    let network_before = runtime.network_service();

    runtime.reset_services();

    let storage_after = runtime.storage_service();
    let network_after = runtime.network_service();

    assert!(!Arc::ptr_eq(&storage_before, &storage_after));
    assert!(!Arc::ptr_eq(&network_before, &network_after));
    assert_eq!(storage_before.name(), storage_after.name());
    assert_eq!(network_before.name(), network_after.name());
}

#[test]
#[serial]
fn detect_sees_the_bridge_marker() {
    unsafe { std::env::set_var(BRIDGE_MARKER_ENV, "1") };
    assert_eq!(Environment::detect(), Environment::Native);

    unsafe { std::env::remove_var(BRIDGE_MARKER_ENV) };
    assert_eq!(Environment::detect(), Environment::Web);
}

#[test]
#[serial]
fn reset_reruns_detection_when_constructed_by_detect() {
    let dir = TempDir::new().unwrap();

    unsafe { std::env::remove_var(BRIDGE_MARKER_ENV) };
    let runtime = RuntimeService::new(config(&dir));
    assert!(runtime.is_web());

    unsafe { std::env::set_var(BRIDGE_MARKER_ENV, "1") };
    runtime.reset_services();
    assert!(runtime.is_native());
    assert_eq!(runtime.storage_service().name(), "native-local-store");

    unsafe { std::env::remove_var(BRIDGE_MARKER_ENV) };
}

#[test]
#[serial]
fn pinned_environment_survives_reset() {
    let dir = TempDir::new().unwrap();
    unsafe { std::env::remove_var(BRIDGE_MARKER_ENV) };

    let runtime = RuntimeService::with_environment(Environment::Native, config(&dir));
    runtime.reset_services();
    assert!(runtime.is_native());
}
