//! Calendar events: records, storage and reminder planning.
//!
//! - `model`: the [`Event`] record and its validation
//! - `store`: the async [`EventStore`] boundary and an in-memory backend
//! - `file`: a JSON file backend
//! - `reminder`: reminder times for events with an alarm

pub mod error;
pub mod file;
pub mod model;
pub mod reminder;
pub mod store;

pub use error::{EventError, EventResult};
pub use file::{default_store_path, JsonFileEventStore};
pub use model::{Event, MAX_TITLE_LEN};
pub use reminder::{plan_all, plan_reminders, Reminder, ReminderKind, REMINDER_LEAD_MINUTES};
pub use store::{EventCollection, EventStore, InMemoryEventStore};
