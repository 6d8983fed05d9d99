//! Reminder planning for events with an alarm.
//!
//! Only the plan is computed here; delivering notifications is left to the
//! platform.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::model::Event;

/// How long before the event the first reminder fires.
pub const REMINDER_LEAD_MINUTES: i64 = 10;

/// Which of the two reminders this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Fires `REMINDER_LEAD_MINUTES` before the event
    Upcoming,
    /// Fires at the event time
    Now,
}

/// A planned reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
    /// Unique id, usable as a notification request id
    pub id: Uuid,
    /// Kind of reminder
    pub kind: ReminderKind,
    /// Notification title (the event title)
    pub title: String,
    /// Notification body
    pub message: String,
    /// When to fire
    pub trigger_at: DateTime<Utc>,
}

/// Plans the reminders for one event.
///
/// Events without an alarm get none. Reminders that would fire at or
/// before `now` are left out.
pub fn plan_reminders(event: &Event, now: DateTime<Utc>) -> Vec<Reminder> {
    if !event.alarm {
        return Vec::new();
    }

    let lead = Duration::minutes(REMINDER_LEAD_MINUTES);
    let upcoming = event.event_date.checked_sub_signed(lead).map(|trigger_at| {
        (
            ReminderKind::Upcoming,
            trigger_at,
            format!(
                "Your event is in {} minutes: {}",
                REMINDER_LEAD_MINUTES, event.title
            ),
        )
    });
    let now_reminder = (
        ReminderKind::Now,
        event.event_date,
        format!("Your event is now: {}", event.title),
    );

    upcoming
        .into_iter()
        .chain(std::iter::once(now_reminder))
        .filter(|(_, trigger_at, _)| *trigger_at > now)
        .map(|(kind, trigger_at, message)| Reminder {
            id: Uuid::new_v4(),
            kind,
            title: event.title.clone(),
            message,
            trigger_at,
        })
        .collect()
}

/// Plans reminders for many events, ordered by trigger time.
pub fn plan_all(events: &[Event], now: DateTime<Utc>) -> Vec<Reminder> {
    let mut reminders: Vec<Reminder> = events
        .iter()
        .flat_map(|event| plan_reminders(event, now))
        .collect();
    reminders.sort_by_key(|r| r.trigger_at);
    reminders
}
