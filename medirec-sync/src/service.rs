//! The sync orchestrator.

use crate::error::SyncError;
use crate::keys::{SYNC_METADATA, SYNC_QUEUE};
use chrono::{DateTime, SecondsFormat, Utc};
use medirec_network::{NetworkError, NetworkService, RequestOptions};
use medirec_storage::{StorageResult, StorageService};
use medirec_types::{
    ChangeKind, EntityKind, PendingChange, SyncErrorRecord, SyncMetadata, SyncReport,
};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How often the automatic cycle fires.
pub const SYNC_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Upload attempts per change before it is permanently dropped.
pub const MAX_RETRIES: u32 = 3;

/// Backoff base for re-dispatching an already-retried change.
pub const INITIAL_BACKOFF: Duration = Duration::from_millis(1000);

/// Tunables for the sync engine.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Period of the automatic cycle.
    pub interval: Duration,
    /// Upload attempts per change.
    pub max_retries: u32,
    /// Backoff base before re-dispatching a retried change.
    pub initial_backoff: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: SYNC_INTERVAL,
            max_retries: MAX_RETRIES,
            initial_backoff: INITIAL_BACKOFF,
        }
    }
}

/// Orchestrates upload of queued local mutations and download of server
/// deltas through the runtime's storage and network services.
pub struct SyncService {
    storage: Arc<dyn StorageService>,
    network: Arc<dyn NetworkService>,
    config: SyncConfig,
    /// The only concurrency-control primitive: set while a cycle runs,
    /// concurrent callers fail fast instead of queuing.
    syncing: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Clears the syncing flag on every exit path of a cycle.
struct SyncFlagGuard<'a>(&'a AtomicBool);

impl Drop for SyncFlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct UploadOutcome {
    uploaded: usize,
    conflicts: usize,
    errors: Vec<SyncErrorRecord>,
}

impl SyncService {
    /// Creates an engine with the standard interval and retry limits.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageService>, network: Arc<dyn NetworkService>) -> Self {
        Self::with_config(storage, network, SyncConfig::default())
    }

    /// Creates an engine with custom tunables.
    #[must_use]
    pub fn with_config(
        storage: Arc<dyn StorageService>,
        network: Arc<dyn NetworkService>,
        config: SyncConfig,
    ) -> Self {
        Self {
            storage,
            network,
            config,
            syncing: AtomicBool::new(false),
            task: Mutex::new(None),
        }
    }

    /// Whether a cycle is currently running.
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }

    /// Arms the repeating timer and triggers one cycle immediately.
    /// Starting an already started engine is a no-op.
    pub fn start(self: Arc<Self>) {
        let mut task = self.task.lock().unwrap();
        if task.is_some() {
            warn!("sync service is already started");
            return;
        }

        // The timer holds a weak handle so it cannot keep the engine alive
        // after every caller has dropped theirs.
        let service = Arc::downgrade(&self);
        let interval = self.config.interval;
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let Some(service) = service.upgrade() else {
                    return;
                };
                // Each cycle runs on its own task so disarming the timer
                // never interrupts a cycle that is already in flight.
                tokio::spawn(async move {
                    let report = service.sync_now().await;
                    if !report.success {
                        debug!(errors = report.errors.len(), "automatic sync incomplete");
                    }
                });
            }
        }));
    }

    /// Disarms the timer. An in-flight cycle is not interrupted; only
    /// future firings are prevented.
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().unwrap().take() {
            task.abort();
        }
    }

    /// Appends a local mutation to the persisted outbox, regardless of
    /// connectivity, and refreshes the pending count in the metadata.
    /// Duplicate record IDs are stored as separate entries.
    pub async fn queue_change(&self, change: PendingChange) -> StorageResult<()> {
        let mut queue = self.pending_changes().await;
        queue.push(change);
        self.storage.save_as(SYNC_QUEUE, &queue).await?;

        let mut metadata = self.sync_metadata().await;
        metadata.pending_changes = queue.len();
        self.storage.save_as(SYNC_METADATA, &metadata).await?;

        debug!(pending = queue.len(), "queued local change");
        Ok(())
    }

    /// The persisted outbox, oldest first.
    pub async fn pending_changes(&self) -> Vec<PendingChange> {
        self.storage
            .get_as::<Vec<PendingChange>>(SYNC_QUEUE)
            .await
            .unwrap_or_default()
    }

    /// The persisted sync bookkeeping.
    pub async fn sync_metadata(&self) -> SyncMetadata {
        self.storage
            .get_as::<SyncMetadata>(SYNC_METADATA)
            .await
            .unwrap_or_default()
    }

    /// Runs one cycle: connectivity gate, upload, download, metadata.
    ///
    /// Fails fast with a single-error report if a cycle is already
    /// running (performing no I/O at all) or if the server is
    /// unreachable.
    pub async fn sync_now(&self) -> SyncReport {
        if self
            .syncing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return SyncReport::rejected("Sync already in progress");
        }
        let _guard = SyncFlagGuard(&self.syncing);

        if !self.network.check_connectivity().await {
            return SyncReport::rejected("No network connectivity");
        }

        let mut report = SyncReport::default();

        let upload = self.upload_pending().await;
        report.uploaded = upload.uploaded;
        report.conflicts = upload.conflicts;
        report.errors.extend(upload.errors);

        let (downloaded, download_errors) = self.download_updates().await;
        report.downloaded = downloaded;
        report.errors.extend(download_errors);

        self.update_metadata(&mut report).await;

        info!(
            success = report.success,
            uploaded = report.uploaded,
            downloaded = report.downloaded,
            conflicts = report.conflicts,
            "sync cycle finished"
        );
        report
    }

    // ── Upload ───────────────────────────────────────────────────

    /// Drains the outbox in FIFO order. The queue persisted afterwards
    /// holds exactly the requeued entries, in their original order.
    async fn upload_pending(&self) -> UploadOutcome {
        let queue = self.pending_changes().await;
        let mut outcome = UploadOutcome::default();
        if queue.is_empty() {
            return outcome;
        }

        let mut remaining: Vec<PendingChange> = Vec::new();

        for mut change in queue {
            match self.upload_change(&change).await {
                Ok(()) => {
                    outcome.uploaded += 1;
                    debug!(change = %change.id, "uploaded change");
                }
                Err(NetworkError::ClientError { status: 409, body }) => {
                    outcome.conflicts += 1;
                    if local_wins(&change, body.as_ref()) {
                        change.retries += 1;
                        if change.retries < self.config.max_retries {
                            remaining.push(change);
                        } else {
                            debug!(change = %change.id, "conflict retries exhausted, dropping");
                        }
                    } else {
                        // Server version is newer: let it win, silently.
                        debug!(change = %change.id, "server version newer, dropping change");
                    }
                }
                Err(e) if e.is_retryable() => {
                    change.retries += 1;
                    if change.retries < self.config.max_retries {
                        warn!(change = %change.id, retries = change.retries, error = %e,
                            "upload failed, requeueing");
                        remaining.push(change);
                    } else {
                        warn!(change = %change.id, error = %e, "max retries reached, dropping");
                        outcome.errors.push(SyncErrorRecord::for_change(
                            Some(change.id),
                            format!("max retries ({}) reached: {e}", self.config.max_retries),
                            change.retries,
                        ));
                    }
                }
                Err(e) => {
                    // Authentication and client errors are not recoverable
                    // by retrying the same request.
                    warn!(change = %change.id, error = %e, "upload permanently failed");
                    outcome.errors.push(SyncErrorRecord::for_change(
                        Some(change.id),
                        e.to_string(),
                        change.retries,
                    ));
                }
            }
        }

        if let Err(e) = self.storage.save_as(SYNC_QUEUE, &remaining).await {
            warn!(error = %e, "failed to persist sync queue");
            outcome
                .errors
                .push(SyncErrorRecord::new(format!("failed to persist sync queue: {e}")));
        }

        outcome
    }

    /// Dispatches one change to its REST endpoint, backing off first if
    /// it has already been retried.
    async fn upload_change(&self, change: &PendingChange) -> Result<(), NetworkError> {
        if change.retries > 0 {
            let backoff = self.config.initial_backoff * 2u32.saturating_pow(change.retries - 1);
            tokio::time::sleep(backoff).await;
        }

        let endpoint = change.entity.endpoint();
        match change.kind {
            ChangeKind::Create => {
                self.network
                    .post(&endpoint, &change.data, RequestOptions::default())
                    .await?;
            }
            ChangeKind::Update => {
                let id = change
                    .record_id()
                    .ok_or_else(|| NetworkError::Unknown("change payload has no id".into()))?;
                self.network
                    .patch(&format!("{endpoint}/{id}"), &change.data, RequestOptions::default())
                    .await?;
            }
            ChangeKind::Delete => {
                let id = change
                    .record_id()
                    .ok_or_else(|| NetworkError::Unknown("change payload has no id".into()))?;
                self.network
                    .delete(&format!("{endpoint}/{id}"), RequestOptions::default())
                    .await?;
            }
        }
        Ok(())
    }

    // ── Download ─────────────────────────────────────────────────

    /// Pulls deltas for every entity kind. One kind's failure is
    /// recorded and the remaining kinds still download.
    async fn download_updates(&self) -> (usize, Vec<SyncErrorRecord>) {
        let since = self.sync_metadata().await.last_successful_sync;
        let mut downloaded = 0;
        let mut errors = Vec::new();

        for entity in EntityKind::ALL {
            match self.download_entity(entity, since).await {
                Ok(count) => downloaded += count,
                Err(e) => {
                    warn!(%entity, error = %e, "entity download failed");
                    errors.push(SyncErrorRecord::new(format!(
                        "failed to download {entity} updates: {e}"
                    )));
                }
            }
        }

        (downloaded, errors)
    }

    async fn download_entity(
        &self,
        entity: EntityKind,
        since: Option<DateTime<Utc>>,
    ) -> Result<usize, SyncError> {
        let url = match since {
            Some(since) => format!(
                "{}?since={}",
                entity.endpoint(),
                since.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
            None => entity.endpoint(),
        };

        let response = self.network.get(&url, RequestOptions::default()).await?;
        if response.is_null() {
            return Ok(0);
        }
        let items: Vec<Value> = serde_json::from_value(response)
            .map_err(|e| SyncError::UnexpectedResponse(format!("expected an array: {e}")))?;

        for item in &items {
            let Some(id) = record_id(item) else {
                warn!(%entity, "downloaded record has no id, skipping");
                continue;
            };
            self.storage
                .save(&entity.record_key(&id), item)
                .await
                .map_err(SyncError::Storage)?;
        }

        // The collection cache is replaced wholesale with the server's list.
        self.storage
            .save(&entity.collection_key(), &Value::Array(items.clone()))
            .await
            .map_err(SyncError::Storage)?;

        Ok(items.len())
    }

    // ── Metadata ─────────────────────────────────────────────────

    /// Final step of every cycle: stamps the sync times, recomputes the
    /// pending count from the queue, and folds this cycle's errors into
    /// the bounded ring.
    async fn update_metadata(&self, report: &mut SyncReport) {
        report.success = report.errors.is_empty();

        let mut metadata = self.sync_metadata().await;
        let now = Utc::now();
        metadata.last_sync_time = Some(now);
        if report.success {
            metadata.last_successful_sync = Some(now);
        }
        metadata.pending_changes = self.pending_changes().await.len();
        metadata.conflicts += report.conflicts as u64;
        metadata.record_errors(&report.errors);

        if let Err(e) = self.storage.save_as(SYNC_METADATA, &metadata).await {
            warn!(error = %e, "failed to persist sync metadata");
            report
                .errors
                .push(SyncErrorRecord::new(format!("failed to persist sync metadata: {e}")));
            report.success = false;
        }
    }
}

impl Drop for SyncService {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().unwrap().take() {
            task.abort();
        }
    }
}

/// Last-write-wins: the local change survives when it is newer than the
/// server's `serverUpdatedAt`, or when the server timestamp cannot be
/// determined.
fn local_wins(change: &PendingChange, conflict_body: Option<&Value>) -> bool {
    match server_updated_at(conflict_body) {
        Some(server) => change.timestamp > server,
        None => true,
    }
}

/// Reads the required `serverUpdatedAt` field from a 409 response body.
fn server_updated_at(body: Option<&Value>) -> Option<DateTime<Utc>> {
    let raw = body?.get("serverUpdatedAt")?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// A downloaded record's `id`, accepting strings and integers the way
/// the server may emit them.
fn record_id(item: &Value) -> Option<String> {
    match item.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
