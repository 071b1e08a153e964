//! Persisted sync bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How many diagnostic errors the metadata ring keeps.
pub const MAX_RECENT_ERRORS: usize = 10;

/// An immutable record of a permanently failed or diagnostic sync event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncErrorRecord {
    /// Unique ID of this record.
    pub id: Uuid,
    /// The queue entry this error relates to, if any.
    pub change_id: Option<Uuid>,
    /// Human-readable description.
    pub error: String,
    /// When the error was recorded.
    pub timestamp: DateTime<Utc>,
    /// How many retries the related change had accumulated.
    pub retries: u32,
}

impl SyncErrorRecord {
    /// Creates a record for an error not tied to any queue entry.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self::for_change(None, error, 0)
    }

    /// Creates a record tied to a specific queue entry.
    #[must_use]
    pub fn for_change(change_id: Option<Uuid>, error: impl Into<String>, retries: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            change_id,
            error: error.into(),
            timestamp: Utc::now(),
            retries,
        }
    }
}

/// Sync bookkeeping, mutated only by the sync service at the end of a
/// cycle (and after queueing a change, for `pending_changes`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncMetadata {
    /// When the last cycle finished, successful or not.
    pub last_sync_time: Option<DateTime<Utc>>,
    /// When the last fully successful cycle finished. Drives `?since=`.
    pub last_successful_sync: Option<DateTime<Utc>>,
    /// Current length of the persisted queue.
    pub pending_changes: usize,
    /// Total conflicts seen across all cycles.
    pub conflicts: u64,
    /// Bounded ring of recent errors, most recent first.
    pub errors: Vec<SyncErrorRecord>,
}

impl SyncMetadata {
    /// Prepends a cycle's errors and truncates the ring to its capacity.
    pub fn record_errors(&mut self, errors: &[SyncErrorRecord]) {
        let mut merged = Vec::with_capacity(errors.len() + self.errors.len());
        merged.extend_from_slice(errors);
        merged.append(&mut self.errors);
        merged.truncate(MAX_RECENT_ERRORS);
        self.errors = merged;
    }
}
