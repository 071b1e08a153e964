//! Queued local mutations, the outbox entries.

use crate::entity::EntityKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The kind of mutation a queued change represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

/// A local mutation waiting to be uploaded.
///
/// Owned exclusively by the persisted queue from creation until it is
/// uploaded, resolved in the server's favor, or permanently dropped after
/// exhausting its retries. `data` is the full record payload and must
/// contain an `id` field for updates and deletes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingChange {
    /// Unique ID of this queue entry (not of the record it carries).
    pub id: Uuid,
    /// What kind of mutation this is.
    pub kind: ChangeKind,
    /// Which collection the record belongs to.
    pub entity: EntityKind,
    /// The record payload, opaque to the sync layer.
    pub data: Value,
    /// When the mutation happened locally. Used for last-write-wins.
    pub timestamp: DateTime<Utc>,
    /// How many upload attempts have failed so far.
    pub retries: u32,
}

impl PendingChange {
    /// Creates a new change stamped with the current time and zero retries.
    #[must_use]
    pub fn new(kind: ChangeKind, entity: EntityKind, data: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            entity,
            data,
            timestamp: Utc::now(),
            retries: 0,
        }
    }

    /// The `id` field of the carried record, if present.
    #[must_use]
    pub fn record_id(&self) -> Option<&str> {
        self.data.get("id").and_then(Value::as_str)
    }
}
