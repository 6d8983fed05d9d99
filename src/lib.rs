//! Digital Assistant Library
//!
//! This library provides the core functionality for the assistant CLI.
//! It includes:
//! - Countdown timer manager with pause, extra time and an alarm
//! - Alarm playback through the default audio device
//! - Calendar events with per-user storage and reminder planning
//! - CLI command parsing and display utilities
//! - Type definitions for configuration and state

pub mod cli;
pub mod events;
pub mod sound;
pub mod timer;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{format_hms, hms_to_seconds, TimerConfig, TimerPhase, TimerState};

// Re-export timer types
pub use timer::{TimerEvent, TimerManager};

// Re-export sound types
pub use sound::{
    try_create_player, AlarmPlayer, MockAlarmPlayer, RodioAlarmPlayer, SoundError, SoundSource,
};

// Re-export event types
pub use events::{
    plan_all, plan_reminders, Event, EventError, EventStore, InMemoryEventStore,
    JsonFileEventStore, Reminder, ReminderKind,
};
