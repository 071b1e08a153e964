//! Per-cycle sync outcome.

use crate::metadata::SyncErrorRecord;
use serde::{Deserialize, Serialize};

/// The outcome of one sync cycle. Returned to the caller, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    /// Whether the cycle completed without recording any error.
    pub success: bool,
    /// Queue entries uploaded this cycle.
    pub uploaded: usize,
    /// Records downloaded this cycle, across all entity kinds.
    pub downloaded: usize,
    /// Conflicts encountered this cycle.
    pub conflicts: usize,
    /// Errors recorded this cycle.
    pub errors: Vec<SyncErrorRecord>,
}

impl SyncReport {
    /// A fail-fast report with a single error and no I/O performed.
    #[must_use]
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            errors: vec![SyncErrorRecord::new(error)],
            ..Self::default()
        }
    }
}
