use medirec_types::{ChangeKind, EntityKind, PendingChange};
use serde_json::json;

#[test]
fn new_change_starts_with_zero_retries() {
    let change = PendingChange::new(
        ChangeKind::Create,
        EntityKind::Patient,
        json!({"id": "p1", "name": "Ana"}),
    );
    assert_eq!(change.retries, 0);
    assert_eq!(change.entity, EntityKind::Patient);
    assert_eq!(change.kind, ChangeKind::Create);
}

#[test]
fn record_id_reads_the_payload_id() {
    let change = PendingChange::new(
        ChangeKind::Update,
        EntityKind::Appointment,
        json!({"id": "a7", "slot": "09:00"}),
    );
    assert_eq!(change.record_id(), Some("a7"));
}

#[test]
fn record_id_is_none_when_missing_or_not_a_string() {
    let no_id = PendingChange::new(ChangeKind::Create, EntityKind::Message, json!({"body": "hi"}));
    assert_eq!(no_id.record_id(), None);

    let numeric = PendingChange::new(ChangeKind::Update, EntityKind::Message, json!({"id": 3}));
    assert_eq!(numeric.record_id(), None);
}

#[test]
fn change_serde_roundtrip_preserves_payload() {
    let change = PendingChange::new(
        ChangeKind::Delete,
        EntityKind::Consultation,
        json!({"id": "c2", "notes": ["á", "β"]}),
    );
    let json = serde_json::to_string(&change).unwrap();
    let back: PendingChange = serde_json::from_str(&json).unwrap();
    assert_eq!(back.id, change.id);
    assert_eq!(back.data, change.data);
    assert_eq!(back.timestamp, change.timestamp);
}

#[test]
fn distinct_changes_get_distinct_ids() {
    let a = PendingChange::new(ChangeKind::Create, EntityKind::Patient, json!({"id": "x"}));
    let b = PendingChange::new(ChangeKind::Create, EntityKind::Patient, json!({"id": "x"}));
    assert_ne!(a.id, b.id);
}
