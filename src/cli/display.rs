//! Display utilities for the assistant CLI.
//!
//! This module provides formatted output for:
//! - Countdown state and timer events
//! - Event listings and store results
//! - Reminder plans
//! - Error messages

use chrono::{DateTime, Utc};

use crate::events::{Event, Reminder, ReminderKind};
use crate::timer::TimerEvent;
use crate::types::{format_hms, TimerState};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the keys understood by the interactive timer.
    pub fn show_timer_help(extra_seconds: u32) {
        println!(
            "Commands: [p] start/pause  [e] +{}s  [r] reset  [d] dismiss alarm  [s] status  [q] quit",
            extra_seconds
        );
    }

    /// Shows a timer event.
    pub fn show_timer_event(event: &TimerEvent) {
        println!("{}", Self::format_timer_event(event));
    }

    /// Shows the full timer state.
    pub fn show_timer_state(state: &TimerState) {
        println!("{}", Self::format_timer_state(state));
    }

    /// Shows an unrecognised interactive command.
    pub fn show_unknown_command(input: &str) {
        eprintln!("Unknown command: {}", input.trim());
    }

    /// Shows a user's events.
    pub fn show_events(user: &str, events: &[Event]) {
        if events.is_empty() {
            println!("No events for {}", user);
            return;
        }
        println!("Events for {}", user);
        println!("─────────────────────────────");
        for event in events {
            println!("{}", Self::format_event(event));
        }
    }

    /// Shows a successful insert.
    pub fn show_event_added(event: &Event) {
        println!("* Event added: {}", event.title);
        println!("  When: {}", Self::format_date(&event.event_date));
    }

    /// Shows the result of an update.
    pub fn show_events_updated(title: &str, count: usize) {
        if count == 0 {
            println!("No event titled '{}'", title);
        } else {
            println!("* Updated {} event(s) titled '{}'", count, title);
        }
    }

    /// Shows the result of a delete.
    pub fn show_events_deleted(title: &str, count: usize) {
        if count == 0 {
            println!("No event titled '{}'", title);
        } else {
            println!("* Deleted {} event(s) titled '{}'", count, title);
        }
    }

    /// Shows planned reminders.
    pub fn show_reminders(reminders: &[Reminder]) {
        if reminders.is_empty() {
            println!("No upcoming reminders");
            return;
        }
        for reminder in reminders {
            println!("{}", Self::format_reminder(reminder));
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// One line per timer event, rendered from the values it carries.
    fn format_timer_event(event: &TimerEvent) -> String {
        match event {
            TimerEvent::DurationSet { total_seconds } => {
                format!("Timer set to {}", format_hms(*total_seconds))
            }
            TimerEvent::Started { remaining_seconds } => {
                format!("> Started  {}", format_hms(*remaining_seconds))
            }
            TimerEvent::Tick { remaining_seconds } => format!("  {}", format_hms(*remaining_seconds)),
            TimerEvent::Paused { remaining_seconds } => {
                format!("|| Paused  {}", format_hms(*remaining_seconds))
            }
            TimerEvent::ExtraTimeAdded {
                added_seconds,
                remaining_seconds,
            } => format!(
                "+ {}s added, now {}",
                added_seconds,
                format_hms(*remaining_seconds)
            ),
            TimerEvent::Completed => "*** Time is up! Press [d] to dismiss the alarm ***".to_string(),
            TimerEvent::Reset => "[] Reset".to_string(),
            TimerEvent::AlarmDismissed => "Alarm dismissed".to_string(),
        }
    }

    fn format_timer_state(state: &TimerState) -> String {
        let mut out = format!(
            "{} [{}] elapsed {}s of {}s",
            state.display_text,
            state.phase().as_str(),
            state.elapsed_seconds(),
            state.total_duration_seconds
        );
        if state.alarm_active {
            out.push_str(" (alarm)");
        }
        out
    }

    fn format_event(event: &Event) -> String {
        let mut line = format!("{}  {}", Self::format_date(&event.event_date), event.title);
        if event.alarm {
            line.push_str(" [alarm]");
        }
        if !event.location.is_empty() {
            line.push_str(&format!(" @ {}", event.location));
        }
        if !event.description.is_empty() {
            line.push_str(&format!("\n    {}", event.description));
        }
        line
    }

    fn format_reminder(reminder: &Reminder) -> String {
        let kind = match reminder.kind {
            ReminderKind::Upcoming => "soon",
            ReminderKind::Now => "now ",
        };
        format!(
            "{}  [{}] {}",
            Self::format_date(&reminder.trigger_at),
            kind,
            reminder.message
        )
    }

    fn format_date(date: &DateTime<Utc>) -> String {
        date.format("%Y-%m-%d %H:%M UTC").to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
