//! Shared type definitions for the medirec offline runtime.
//!
//! This crate defines the data model the sync layer persists and reports:
//! - Entity kinds and their REST/storage addressing
//! - Queued local mutations (the outbox entries)
//! - Sync metadata and per-cycle reports
//!
//! Domain record shapes (patients, appointments, …) are deliberately
//! opaque here: the runtime moves them around as JSON values and never
//! interprets them beyond their `id` field.

mod change;
mod entity;
mod metadata;
mod report;

pub use change::{ChangeKind, PendingChange};
pub use entity::EntityKind;
pub use metadata::{SyncErrorRecord, SyncMetadata, MAX_RECENT_ERRORS};
pub use report::SyncReport;
