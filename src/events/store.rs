//! Event data access.
//!
//! [`EventStore`] is the async request/response boundary the presentation
//! layer talks to. [`EventCollection`] holds the per-user bookkeeping shared
//! by every backend; [`InMemoryEventStore`] keeps it in memory.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use tracing::debug;

use super::error::{EventError, EventResult};
use super::model::Event;

// ============================================================================
// EventStore
// ============================================================================

/// Per-user event storage.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Returns the user's events, earliest first.
    async fn list_events(&self, user_id: &str) -> EventResult<Vec<Event>>;

    /// Adds an event.
    ///
    /// # Errors
    ///
    /// Returns `EventError::InvalidEvent` if the event fails validation.
    async fn insert_event(&self, event: Event, user_id: &str) -> EventResult<()>;

    /// Replaces every event titled `original_title` with `event`.
    ///
    /// Returns the number of events replaced, which may be zero.
    async fn update_event(
        &self,
        original_title: &str,
        event: Event,
        user_id: &str,
    ) -> EventResult<usize>;

    /// Removes every event titled `title`. Returns the number removed.
    async fn delete_event(&self, title: &str, user_id: &str) -> EventResult<usize>;

    /// Returns a receiver that sees the user's sorted events after every change.
    async fn observe_events(&self, user_id: &str) -> EventResult<watch::Receiver<Vec<Event>>>;

    /// Drops every observer channel. Existing receivers see the channel close.
    fn clear_listeners(&self);
}

// ============================================================================
// EventCollection
// ============================================================================

/// Events grouped by user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCollection {
    #[serde(default)]
    users: BTreeMap<String, Vec<Event>>,
}

fn check_user(user_id: &str) -> EventResult<()> {
    if user_id.trim().is_empty() {
        return Err(EventError::InvalidUser);
    }
    Ok(())
}

impl EventCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user's events sorted by date. Ties keep insertion order.
    pub fn events_for(&self, user_id: &str) -> Vec<Event> {
        let mut events = self.users.get(user_id).cloned().unwrap_or_default();
        events.sort_by_key(|e| e.event_date);
        events
    }

    /// Adds an event for the user.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty user id or invalid event.
    pub fn insert(&mut self, user_id: &str, event: Event) -> EventResult<()> {
        check_user(user_id)?;
        event.validate()?;
        self.users.entry(user_id.to_string()).or_default().push(event);
        Ok(())
    }

    /// Replaces every event titled `original_title`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty user id or invalid event.
    pub fn update(&mut self, user_id: &str, original_title: &str, event: Event) -> EventResult<usize> {
        check_user(user_id)?;
        event.validate()?;
        let Some(events) = self.users.get_mut(user_id) else {
            return Ok(0);
        };
        let mut replaced = 0;
        for slot in events.iter_mut().filter(|e| e.title == original_title) {
            *slot = event.clone();
            replaced += 1;
        }
        Ok(replaced)
    }

    /// Removes every event titled `title`.
    ///
    /// # Errors
    ///
    /// Returns `EventError::InvalidUser` for an empty user id.
    pub fn delete(&mut self, user_id: &str, title: &str) -> EventResult<usize> {
        check_user(user_id)?;
        let Some(events) = self.users.get_mut(user_id) else {
            return Ok(0);
        };
        let before = events.len();
        events.retain(|e| e.title != title);
        let removed = before - events.len();
        if events.is_empty() {
            self.users.remove(user_id);
        }
        Ok(removed)
    }
}

// ============================================================================
// Listeners
// ============================================================================

/// Observer channels keyed by user.
#[derive(Debug, Default)]
pub(crate) struct Listeners {
    senders: Mutex<HashMap<String, watch::Sender<Vec<Event>>>>,
}

impl Listeners {
    pub(crate) fn subscribe(&self, user_id: &str, current: Vec<Event>) -> watch::Receiver<Vec<Event>> {
        let mut senders = self.senders.lock().unwrap_or_else(PoisonError::into_inner);
        match senders.get(user_id) {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, receiver) = watch::channel(current);
                senders.insert(user_id.to_string(), sender);
                receiver
            }
        }
    }

    pub(crate) fn notify(&self, user_id: &str, events: Vec<Event>) {
        let senders = self.senders.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(sender) = senders.get(user_id) {
            sender.send_replace(events);
        }
    }

    pub(crate) fn clear(&self) {
        let mut senders = self.senders.lock().unwrap_or_else(PoisonError::into_inner);
        debug!("Dropping {} event listener(s)", senders.len());
        senders.clear();
    }
}

// ============================================================================
// InMemoryEventStore
// ============================================================================

/// Event store that lives for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    collection: RwLock<EventCollection>,
    listeners: Listeners,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `collection`.
    pub fn with_collection(collection: EventCollection) -> Self {
        Self {
            collection: RwLock::new(collection),
            listeners: Listeners::default(),
        }
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn list_events(&self, user_id: &str) -> EventResult<Vec<Event>> {
        check_user(user_id)?;
        Ok(self.collection.read().await.events_for(user_id))
    }

    async fn insert_event(&self, event: Event, user_id: &str) -> EventResult<()> {
        let mut collection = self.collection.write().await;
        collection.insert(user_id, event)?;
        self.listeners.notify(user_id, collection.events_for(user_id));
        Ok(())
    }

    async fn update_event(
        &self,
        original_title: &str,
        event: Event,
        user_id: &str,
    ) -> EventResult<usize> {
        let mut collection = self.collection.write().await;
        let replaced = collection.update(user_id, original_title, event)?;
        if replaced > 0 {
            self.listeners.notify(user_id, collection.events_for(user_id));
        }
        Ok(replaced)
    }

    async fn delete_event(&self, title: &str, user_id: &str) -> EventResult<usize> {
        let mut collection = self.collection.write().await;
        let removed = collection.delete(user_id, title)?;
        if removed > 0 {
            self.listeners.notify(user_id, collection.events_for(user_id));
        }
        Ok(removed)
    }

    async fn observe_events(&self, user_id: &str) -> EventResult<watch::Receiver<Vec<Event>>> {
        check_user(user_id)?;
        let current = self.collection.read().await.events_for(user_id);
        Ok(self.listeners.subscribe(user_id, current))
    }

    fn clear_listeners(&self) {
        self.listeners.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0).unwrap()
    }

    mod collection_tests {
        use super::*;

        #[test]
        fn test_events_sorted_by_date() {
            let mut collection = EventCollection::new();
            collection.insert("u1", Event::new("late", at(18))).unwrap();
            collection.insert("u1", Event::new("early", at(8))).unwrap();
            collection.insert("u1", Event::new("noon", at(12))).unwrap();

            let titles: Vec<_> = collection
                .events_for("u1")
                .into_iter()
                .map(|e| e.title)
                .collect();
            assert_eq!(titles, vec!["early", "noon", "late"]);
        }

        #[test]
        fn test_users_are_isolated() {
            let mut collection = EventCollection::new();
            collection.insert("u1", Event::new("mine", at(9))).unwrap();
            assert!(collection.events_for("u2").is_empty());
        }

        #[test]
        fn test_insert_rejects_invalid() {
            let mut collection = EventCollection::new();
            let err = collection.insert("u1", Event::new(" ", at(9))).unwrap_err();
            assert!(matches!(err, EventError::InvalidEvent(_)));

            let err = collection.insert("", Event::new("ok", at(9))).unwrap_err();
            assert!(matches!(err, EventError::InvalidUser));
        }

        #[test]
        fn test_update_replaces_all_matching_titles() {
            let mut collection = EventCollection::new();
            collection.insert("u1", Event::new("gym", at(7))).unwrap();
            collection.insert("u1", Event::new("gym", at(19))).unwrap();
            collection.insert("u1", Event::new("work", at(9))).unwrap();

            let replaced = collection
                .update("u1", "gym", Event::new("swim", at(7)))
                .unwrap();

            assert_eq!(replaced, 2);
            let titles: Vec<_> = collection
                .events_for("u1")
                .into_iter()
                .map(|e| e.title)
                .collect();
            assert_eq!(titles, vec!["swim", "swim", "work"]);
        }

        #[test]
        fn test_update_missing_title_replaces_nothing() {
            let mut collection = EventCollection::new();
            collection.insert("u1", Event::new("gym", at(7))).unwrap();
            assert_eq!(
                collection
                    .update("u1", "nope", Event::new("x", at(7)))
                    .unwrap(),
                0
            );
            assert_eq!(collection.update("u9", "gym", Event::new("x", at(7))).unwrap(), 0);
        }

        #[test]
        fn test_update_validates_replacement() {
            let mut collection = EventCollection::new();
            collection.insert("u1", Event::new("gym", at(7))).unwrap();
            assert!(collection.update("u1", "gym", Event::new("", at(7))).is_err());
            assert_eq!(collection.events_for("u1")[0].title, "gym");
        }

        #[test]
        fn test_delete() {
            let mut collection = EventCollection::new();
            collection.insert("u1", Event::new("gym", at(7))).unwrap();
            collection.insert("u1", Event::new("work", at(9))).unwrap();

            assert_eq!(collection.delete("u1", "gym").unwrap(), 1);
            assert_eq!(collection.delete("u1", "gym").unwrap(), 0);
            assert_eq!(collection.delete("u1", "work").unwrap(), 1);
            assert_eq!(collection, EventCollection::new());
        }
    }

    mod in_memory_tests {
        use super::*;

        #[tokio::test]
        async fn test_crud_round() {
            let store = InMemoryEventStore::new();
            store
                .insert_event(Event::new("Review", at(15)), "alice")
                .await
                .unwrap();
            store
                .insert_event(Event::new("Planning", at(10)), "alice")
                .await
                .unwrap();

            let events = store.list_events("alice").await.unwrap();
            assert_eq!(events.len(), 2);
            assert_eq!(events[0].title, "Planning");

            let replaced = store
                .update_event("Review", Event::new("Retro", at(16)), "alice")
                .await
                .unwrap();
            assert_eq!(replaced, 1);

            let removed = store.delete_event("Planning", "alice").await.unwrap();
            assert_eq!(removed, 1);

            let events = store.list_events("alice").await.unwrap();
            assert_eq!(events, vec![Event::new("Retro", at(16))]);
        }

        #[tokio::test]
        async fn test_list_rejects_empty_user() {
            let store = InMemoryEventStore::new();
            assert!(matches!(
                store.list_events("").await,
                Err(EventError::InvalidUser)
            ));
        }

        #[tokio::test]
        async fn test_observe_sees_changes() {
            let store = InMemoryEventStore::new();
            store
                .insert_event(Event::new("First", at(9)), "bob")
                .await
                .unwrap();

            let mut rx = store.observe_events("bob").await.unwrap();
            assert_eq!(rx.borrow().len(), 1);

            store
                .insert_event(Event::new("Second", at(8)), "bob")
                .await
                .unwrap();

            rx.changed().await.unwrap();
            let titles: Vec<_> = rx.borrow_and_update().iter().map(|e| e.title.clone()).collect();
            assert_eq!(titles, vec!["Second", "First"]);
        }

        #[tokio::test]
        async fn test_observe_ignores_other_users() {
            let store = InMemoryEventStore::new();
            let rx = store.observe_events("bob").await.unwrap();

            store
                .insert_event(Event::new("Other", at(9)), "carol")
                .await
                .unwrap();

            assert!(!rx.has_changed().unwrap());
        }

        #[tokio::test]
        async fn test_clear_listeners_closes_receivers() {
            let store = InMemoryEventStore::new();
            let mut rx = store.observe_events("bob").await.unwrap();

            store.clear_listeners();

            assert!(rx.changed().await.is_err());
        }

        #[tokio::test]
        async fn test_with_collection() {
            let mut collection = EventCollection::new();
            collection.insert("dave", Event::new("Seeded", at(11))).unwrap();
            let store = InMemoryEventStore::with_collection(collection);
            assert_eq!(store.list_events("dave").await.unwrap().len(), 1);
        }
    }
}
