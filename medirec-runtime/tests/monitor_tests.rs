use async_trait::async_trait;
use medirec_network::{NetworkError, NetworkResult, NetworkService, RequestOptions};
use medirec_runtime::ConnectivityMonitor;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Network double whose connectivity answers follow a script, falling
/// back to a default once the script runs out.
struct ScriptedNetwork {
    script: Mutex<VecDeque<bool>>,
    fallback: bool,
    checks: AtomicU32,
}

impl ScriptedNetwork {
    fn new(script: impl IntoIterator<Item = bool>, fallback: bool) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback,
            checks: AtomicU32::new(0),
        })
    }

    fn check_count(&self) -> u32 {
        self.checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NetworkService for ScriptedNetwork {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn get(&self, _url: &str, _options: RequestOptions) -> NetworkResult<Value> {
        Err(NetworkError::Unknown("not part of this double".into()))
    }

    async fn post(&self, _url: &str, _body: &Value, _options: RequestOptions) -> NetworkResult<Value> {
        Err(NetworkError::Unknown("not part of this double".into()))
    }

    async fn patch(&self, _url: &str, _body: &Value, _options: RequestOptions) -> NetworkResult<Value> {
        Err(NetworkError::Unknown("not part of this double".into()))
    }

    async fn delete(&self, _url: &str, _options: RequestOptions) -> NetworkResult<Value> {
        Err(NetworkError::Unknown("not part of this double".into()))
    }

    async fn check_connectivity(&self) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback)
    }
}

fn record_events(monitor: &ConnectivityMonitor) -> Arc<Mutex<Vec<bool>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    // dropping the handle without unsubscribing keeps the listener alive
    drop(monitor.on_status_change(move |online| {
        sink.lock().unwrap().push(online);
    }));
    events
}

#[tokio::test]
async fn status_is_optimistically_online_before_any_check() {
    let monitor = ConnectivityMonitor::new(ScriptedNetwork::new([], true));
    assert!(monitor.is_online());
    assert!(!monitor.is_running());
    assert_eq!(monitor.listener_count(), 0);
}

#[tokio::test]
async fn listeners_fire_only_on_transitions() {
    let network = ScriptedNetwork::new([true, false, false, true], true);
    let monitor = ConnectivityMonitor::new(network);
    let events = record_events(&monitor);

    for _ in 0..4 {
        monitor.check_now().await;
    }

    // online→online is silent, then offline, a repeat (silent), then online.
    assert_eq!(*events.lock().unwrap(), vec![false, true]);
    assert!(monitor.is_online());
}

#[tokio::test]
async fn failed_check_counts_as_offline() {
    let network = ScriptedNetwork::new([false], false);
    let monitor = ConnectivityMonitor::new(network);
    let events = record_events(&monitor);

    monitor.check_now().await;

    assert!(!monitor.is_online());
    assert_eq!(*events.lock().unwrap(), vec![false]);
}

#[tokio::test]
async fn panicking_listener_does_not_silence_the_others() {
    let network = ScriptedNetwork::new([false], false);
    let monitor = ConnectivityMonitor::new(network);

    drop(monitor.on_status_change(|_| panic!("bad listener")));
    let events = record_events(&monitor);

    monitor.check_now().await;

    assert_eq!(*events.lock().unwrap(), vec![false]);
}

#[tokio::test]
async fn unsubscribed_listener_is_not_invoked() {
    let network = ScriptedNetwork::new([false, true], true);
    let monitor = ConnectivityMonitor::new(network);

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let handle = monitor.on_status_change(move |online| {
        sink.lock().unwrap().push(online);
    });
    assert_eq!(monitor.listener_count(), 1);

    monitor.check_now().await;
    handle.unsubscribe();
    assert_eq!(monitor.listener_count(), 0);
    monitor.check_now().await;

    assert_eq!(*events.lock().unwrap(), vec![false]);
}

#[tokio::test]
async fn multiple_listeners_all_hear_a_transition() {
    let network = ScriptedNetwork::new([false], false);
    let monitor = ConnectivityMonitor::new(network);
    let first = record_events(&monitor);
    let second = record_events(&monitor);

    monitor.check_now().await;

    assert_eq!(*first.lock().unwrap(), vec![false]);
    assert_eq!(*second.lock().unwrap(), vec![false]);
}

#[tokio::test]
async fn start_checks_immediately() {
    let network = ScriptedNetwork::new([], true);
    let monitor = ConnectivityMonitor::with_interval(
        Arc::clone(&network) as Arc<dyn NetworkService>,
        Duration::from_secs(60),
    );

    monitor.start();
    assert!(monitor.is_running());

    for _ in 0..200 {
        if network.check_count() >= 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(network.check_count() >= 1);
    monitor.stop();
}

#[tokio::test]
async fn stop_prevents_future_checks() {
    let network = ScriptedNetwork::new([], true);
    let monitor = ConnectivityMonitor::with_interval(
        Arc::clone(&network) as Arc<dyn NetworkService>,
        Duration::from_millis(10),
    );

    monitor.start();
    for _ in 0..200 {
        if network.check_count() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    monitor.stop();
    assert!(!monitor.is_running());

    let frozen = network.check_count();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(network.check_count(), frozen);
}

#[tokio::test]
async fn double_start_and_stop_are_safe() {
    let network = ScriptedNetwork::new([], true);
    let monitor = ConnectivityMonitor::with_interval(network, Duration::from_secs(60));

    monitor.start();
    monitor.start();
    assert!(monitor.is_running());

    monitor.stop();
    monitor.stop();
    assert!(!monitor.is_running());
}
