//! Integration tests for the JSON file event store.

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

use digital_assistant::events::{
    plan_all, Event, EventError, EventStore, JsonFileEventStore, ReminderKind,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Creates a store inside a fresh temporary directory.
fn create_store() -> (TempDir, JsonFileEventStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileEventStore::new(dir.path().join("nested").join("events.json"));
    (dir, store)
}

fn event(title: &str, day: u32) -> Event {
    Event::new(title, Utc.with_ymd_and_hms(2026, 5, day, 9, 0, 0).unwrap())
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_missing_file_is_empty() {
    let (_dir, store) = create_store();
    assert!(store.list_events("ada").await.unwrap().is_empty());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_events_survive_a_new_store_instance() {
    let (_dir, store) = create_store();
    store
        .insert_event(event("Review", 3).with_location("Room 2"), "ada")
        .await
        .unwrap();
    store.insert_event(event("Kickoff", 1), "ada").await.unwrap();
    store.insert_event(event("Gym", 2), "bob").await.unwrap();

    let reopened = JsonFileEventStore::new(store.path());
    let ada = reopened.list_events("ada").await.unwrap();
    assert_eq!(
        ada.iter().map(|e| e.title.as_str()).collect::<Vec<_>>(),
        vec!["Kickoff", "Review"]
    );
    assert_eq!(ada[1].location, "Room 2");
    assert_eq!(reopened.list_events("bob").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_file_uses_camel_case_fields() {
    let (_dir, store) = create_store();
    store.insert_event(event("Kickoff", 1), "ada").await.unwrap();

    let json = std::fs::read_to_string(store.path()).unwrap();
    assert!(json.contains("\"eventDate\""));
    assert!(json.contains("\"ada\""));
}

#[tokio::test]
async fn test_empty_file_is_empty_collection() {
    let (_dir, store) = create_store();
    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    std::fs::write(store.path(), "  \n").unwrap();

    assert!(store.list_events("ada").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_corrupt_file_is_a_serialization_error() {
    let (_dir, store) = create_store();
    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    std::fs::write(store.path(), "{not json").unwrap();

    let err = store.list_events("ada").await.unwrap_err();
    assert!(matches!(err, EventError::Serialization(_)));
}

// ============================================================================
// Mutations
// ============================================================================

#[tokio::test]
async fn test_update_and_delete_by_title() {
    let (_dir, store) = create_store();
    store.insert_event(event("Sync", 1), "ada").await.unwrap();
    store.insert_event(event("Sync", 2), "ada").await.unwrap();
    store.insert_event(event("Lunch", 3), "ada").await.unwrap();

    let replaced = store
        .update_event("Sync", event("Standup", 4), "ada")
        .await
        .unwrap();
    assert_eq!(replaced, 2);

    let removed = store.delete_event("Standup", "ada").await.unwrap();
    assert_eq!(removed, 2);

    let left = store.list_events("ada").await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].title, "Lunch");
}

#[tokio::test]
async fn test_missing_title_changes_nothing() {
    let (_dir, store) = create_store();
    store.insert_event(event("Sync", 1), "ada").await.unwrap();

    assert_eq!(store.delete_event("Nope", "ada").await.unwrap(), 0);
    assert_eq!(
        store
            .update_event("Nope", event("Other", 2), "ada")
            .await
            .unwrap(),
        0
    );
    assert_eq!(store.list_events("ada").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_validation_errors() {
    let (_dir, store) = create_store();

    let err = store.insert_event(event("   ", 1), "ada").await.unwrap_err();
    assert!(err.is_validation_error());

    let err = store.insert_event(event("Sync", 1), "").await.unwrap_err();
    assert!(matches!(err, EventError::InvalidUser));
}

#[tokio::test]
async fn test_observers_see_changes() {
    let (_dir, store) = create_store();
    let mut rx = store.observe_events("ada").await.unwrap();
    assert!(rx.borrow().is_empty());

    store.insert_event(event("Sync", 1), "ada").await.unwrap();
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().len(), 1);

    store.clear_listeners();
    assert!(rx.changed().await.is_err());
}

// ============================================================================
// Reminders
// ============================================================================

#[tokio::test]
async fn test_reminders_from_stored_events() {
    let (_dir, store) = create_store();
    let now = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();
    store
        .insert_event(event("Kickoff", 1).with_alarm(true), "ada")
        .await
        .unwrap();
    store.insert_event(event("Lunch", 1), "ada").await.unwrap();

    let events = store.list_events("ada").await.unwrap();
    let reminders = plan_all(&events, now);

    assert_eq!(reminders.len(), 2);
    assert_eq!(reminders[0].kind, ReminderKind::Upcoming);
    assert_eq!(
        reminders[0].trigger_at,
        events[0].event_date - Duration::minutes(10)
    );
    assert_eq!(reminders[1].kind, ReminderKind::Now);
}
