//! Offline synchronization engine for medirec.
//!
//! Reconciles the local key/value store with the remote server:
//! - local mutations are queued (the outbox) and uploaded in FIFO order
//! - server deltas are downloaded per entity kind and written back to
//!   the local store
//! - conflicts resolve last-write-wins against the server's
//!   `serverUpdatedAt` timestamp on 409 responses
//!
//! # Sync cycle
//!
//! Every cycle runs the same four steps, top to bottom: check
//! connectivity, upload pending changes, download updates, update the
//! sync metadata. At most one cycle runs at a time; a concurrent caller
//! fails fast instead of waiting. A cycle is never fatal: every
//! per-change and per-entity failure becomes an error record in the
//! cycle's report and the rest of the cycle proceeds.

mod error;
mod keys;
mod service;

pub use error::SyncError;
pub use keys::{SYNC_METADATA, SYNC_QUEUE};
pub use service::{SyncConfig, SyncService, INITIAL_BACKOFF, MAX_RETRIES, SYNC_INTERVAL};
