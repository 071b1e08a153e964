//! Storage keys owned by the sync service.

/// Persisted outbox: an ordered array of pending changes.
pub const SYNC_QUEUE: &str = "sync:queue";

/// Persisted sync bookkeeping.
pub const SYNC_METADATA: &str = "sync:metadata";
