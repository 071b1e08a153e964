//! Entity kinds synced between the local store and the server.
//!
//! The set is closed: every syncable record belongs to exactly one of
//! these kinds, and each kind maps to one REST collection and one pair
//! of storage key shapes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of records the sync layer knows how to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Patient,
    Appointment,
    Consultation,
    Message,
    Settings,
}

impl EntityKind {
    /// All kinds, in the fixed order downloads are performed.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Patient,
        EntityKind::Appointment,
        EntityKind::Consultation,
        EntityKind::Message,
        EntityKind::Settings,
    ];

    /// The plural collection name used in endpoints and storage keys.
    #[must_use]
    pub const fn plural(&self) -> &'static str {
        match self {
            EntityKind::Patient => "patients",
            EntityKind::Appointment => "appointments",
            EntityKind::Consultation => "consultations",
            EntityKind::Message => "messages",
            EntityKind::Settings => "settings",
        }
    }

    /// The REST collection endpoint for this kind.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("/api/{}", self.plural())
    }

    /// Storage key for a single record of this kind.
    #[must_use]
    pub fn record_key(&self, id: &str) -> String {
        format!("{}:{}", self.plural(), id)
    }

    /// Storage key for the cached full collection of this kind.
    #[must_use]
    pub fn collection_key(&self) -> String {
        format!("{}:all", self.plural())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Patient => "patient",
            EntityKind::Appointment => "appointment",
            EntityKind::Consultation => "consultation",
            EntityKind::Message => "message",
            EntityKind::Settings => "settings",
        };
        write!(f, "{name}")
    }
}
