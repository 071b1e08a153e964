//! Online/offline transition monitoring.
//!
//! The monitor polls the network service and keeps a single boolean.
//! Listeners hear about transitions only; a run of identical readings
//! produces no events. A failed probe counts as offline.

use medirec_network::NetworkService;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How often the monitor checks while running.
pub const MONITOR_INTERVAL: Duration = Duration::from_secs(30);

type Listener = Arc<dyn Fn(bool) + Send + Sync>;
type Listeners = Arc<Mutex<HashMap<u64, Listener>>>;

/// Watches connectivity and notifies listeners on transitions.
pub struct ConnectivityMonitor {
    network: Arc<dyn NetworkService>,
    interval: Duration,
    online: Arc<AtomicBool>,
    listeners: Listeners,
    next_listener_id: AtomicU64,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectivityMonitor {
    /// Creates a stopped monitor with the standard 30-second interval.
    /// The status is optimistically online until the first check.
    #[must_use]
    pub fn new(network: Arc<dyn NetworkService>) -> Self {
        Self::with_interval(network, MONITOR_INTERVAL)
    }

    /// Creates a stopped monitor with a custom interval.
    #[must_use]
    pub fn with_interval(network: Arc<dyn NetworkService>, interval: Duration) -> Self {
        Self {
            network,
            interval,
            online: Arc::new(AtomicBool::new(true)),
            listeners: Arc::new(Mutex::new(HashMap::new())),
            next_listener_id: AtomicU64::new(0),
            task: Mutex::new(None),
        }
    }

    /// The last observed status.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    /// Registers a listener for transitions. The returned handle
    /// unsubscribes it.
    pub fn on_status_change(&self, listener: impl Fn(bool) + Send + Sync + 'static) -> ListenerHandle {
        let id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().unwrap().insert(id, Arc::new(listener));
        ListenerHandle {
            id,
            listeners: Arc::clone(&self.listeners),
        }
    }

    /// Starts monitoring: one immediate check, then one per interval.
    /// Starting an already running monitor is a no-op.
    pub fn start(&self) {
        let mut task = self.task.lock().unwrap();
        if task.is_some() {
            warn!("connectivity monitor is already running");
            return;
        }

        let network = Arc::clone(&self.network);
        let online = Arc::clone(&self.online);
        let listeners = Arc::clone(&self.listeners);
        let interval = self.interval;

        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                check(network.as_ref(), &online, &listeners).await;
            }
        }));
    }

    /// Stops monitoring. Does not reset the last observed status.
    pub fn stop(&self) {
        match self.task.lock().unwrap().take() {
            Some(task) => task.abort(),
            None => warn!("connectivity monitor is not running"),
        }
    }

    /// Whether the background task is armed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.lock().unwrap().is_some()
    }

    /// Runs one check outside the timer.
    pub async fn check_now(&self) {
        check(self.network.as_ref(), &self.online, &self.listeners).await;
    }
}

impl Drop for ConnectivityMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().unwrap().take() {
            task.abort();
        }
    }
}

async fn check(network: &dyn NetworkService, online: &AtomicBool, listeners: &Listeners) {
    let fresh = network.check_connectivity().await;
    let previous = online.swap(fresh, Ordering::SeqCst);
    if previous == fresh {
        return;
    }

    debug!(online = fresh, "connectivity transition");

    // Snapshot under the lock, invoke outside it, so a slow or panicking
    // listener cannot block subscription changes.
    let snapshot: Vec<Listener> = listeners.lock().unwrap().values().cloned().collect();
    for listener in snapshot {
        if catch_unwind(AssertUnwindSafe(|| listener(fresh))).is_err() {
            warn!("connectivity listener panicked");
        }
    }
}

/// Unsubscribes its listener when consumed (or explicitly).
pub struct ListenerHandle {
    id: u64,
    listeners: Listeners,
}

impl ListenerHandle {
    /// Removes the listener this handle was created for.
    pub fn unsubscribe(self) {
        self.listeners.lock().unwrap().remove(&self.id);
    }
}
