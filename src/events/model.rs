//! Calendar event record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{EventError, EventResult};

/// Longest accepted event title, in characters.
pub const MAX_TITLE_LEN: usize = 100;

/// A calendar event owned by one user.
///
/// Events are addressed by title within a user's collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event title
    pub title: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// When the event happens
    pub event_date: DateTime<Utc>,
    /// Where the event happens
    #[serde(default)]
    pub location: String,
    /// Whether reminders should be scheduled
    #[serde(default)]
    pub alarm: bool,
}

impl Event {
    /// Creates an event with no description, location or alarm.
    pub fn new(title: impl Into<String>, event_date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            event_date,
            location: String::new(),
            alarm: false,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Enables or disables reminders.
    pub fn with_alarm(mut self, alarm: bool) -> Self {
        self.alarm = alarm;
        self
    }

    /// Checks the event can be stored.
    ///
    /// # Errors
    ///
    /// Returns `EventError::InvalidEvent` for a blank or overlong title.
    pub fn validate(&self) -> EventResult<()> {
        if self.title.trim().is_empty() {
            return Err(EventError::InvalidEvent("title must not be empty".to_string()));
        }
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(EventError::InvalidEvent(format!(
                "title must be at most {} characters",
                MAX_TITLE_LEN
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_builder() {
        let event = Event::new("Standup", date())
            .with_description("Daily sync")
            .with_location("Room 4")
            .with_alarm(true);

        assert_eq!(event.title, "Standup");
        assert_eq!(event.description, "Daily sync");
        assert_eq!(event.location, "Room 4");
        assert!(event.alarm);
    }

    #[test]
    fn test_validate_blank_title() {
        assert!(Event::new("", date()).validate().is_err());
        assert!(Event::new("   ", date()).validate().is_err());
    }

    #[test]
    fn test_validate_title_length() {
        assert!(Event::new("a".repeat(MAX_TITLE_LEN), date()).validate().is_ok());
        assert!(Event::new("a".repeat(MAX_TITLE_LEN + 1), date())
            .validate()
            .is_err());
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let event = Event::new("Dentist", date()).with_alarm(true);
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("eventDate").is_some());
        assert_eq!(json["alarm"], true);
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"title":"Lunch","eventDate":"2026-03-14T12:00:00Z"}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.title, "Lunch");
        assert!(event.description.is_empty());
        assert!(!event.alarm);
    }
}
