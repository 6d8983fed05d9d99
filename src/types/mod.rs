//! Core data types for the focus timer.
//!
//! This module defines the data structures used for:
//! - Countdown state and its derived phase
//! - Timer configuration with validation
//! - `HH:MM:SS` rendering

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ============================================================================
// Formatting
// ============================================================================

/// Renders a number of seconds as zero-padded `HH:MM:SS`.
///
/// Hours are not wrapped at 24; anything past 99 simply gets more digits.
pub fn format_hms(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Converts an hours/minutes/seconds triple into seconds, saturating at `u32::MAX`.
pub fn hms_to_seconds(hours: u32, minutes: u32, seconds: u32) -> u32 {
    hours
        .saturating_mul(3600)
        .saturating_add(minutes.saturating_mul(60))
        .saturating_add(seconds)
}

// ============================================================================
// TimerPhase
// ============================================================================

/// Phase of the countdown, derived from [`TimerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// No duration set
    #[default]
    Idle,
    /// Duration set, countdown not started
    Configured,
    /// Countdown ticking
    Running,
    /// Countdown interrupted part-way
    Paused,
    /// Countdown reached zero
    Completed,
}

impl TimerPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Configured => "configured",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
            TimerPhase::Completed => "completed",
        }
    }

    /// Returns true if `start` would begin (or rewind) a countdown from this phase.
    pub fn can_start(&self) -> bool {
        matches!(
            self,
            TimerPhase::Configured | TimerPhase::Paused | TimerPhase::Completed
        )
    }
}

// ============================================================================
// TimerConfig
// ============================================================================

/// Configuration for the countdown manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Tick period in milliseconds (10-60000)
    pub tick_interval_ms: u64,
    /// Seconds added by the "extra time" shortcut (1-3600)
    pub extra_time_seconds: u32,
    /// Whether the completion alarm plays sound
    pub sound_enabled: bool,
    /// Audio file for the alarm; the built-in tone is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_sound: Option<PathBuf>,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            extra_time_seconds: 15,
            sound_enabled: true,
            alarm_sound: None,
        }
    }
}

impl TimerConfig {
    /// Sets the tick period.
    pub fn with_tick_interval_ms(mut self, millis: u64) -> Self {
        self.tick_interval_ms = millis;
        self
    }

    /// Sets the amount added by the extra time shortcut.
    pub fn with_extra_time_seconds(mut self, seconds: u32) -> Self {
        self.extra_time_seconds = seconds;
        self
    }

    /// Enables or disables the alarm sound.
    pub fn with_sound_enabled(mut self, enabled: bool) -> Self {
        self.sound_enabled = enabled;
        self
    }

    /// Uses an audio file for the alarm.
    pub fn with_alarm_sound(mut self, path: impl Into<PathBuf>) -> Self {
        self.alarm_sound = Some(path.into());
        self
    }

    /// Returns the tick period as a `Duration`.
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if !(10..=60_000).contains(&self.tick_interval_ms) {
            return Err("tick interval must be between 10 and 60000 ms".to_string());
        }
        if !(1..=3600).contains(&self.extra_time_seconds) {
            return Err("extra time must be between 1 and 3600 seconds".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// Countdown state owned by the timer manager.
///
/// Every mutator keeps `display_text` in sync with `remaining_seconds` and
/// keeps `remaining_seconds <= total_duration_seconds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    /// Duration the countdown starts from
    pub total_duration_seconds: u32,
    /// Seconds left
    pub remaining_seconds: u32,
    /// True while a tick is scheduled
    pub is_running: bool,
    /// `HH:MM:SS` rendering of `remaining_seconds`
    pub display_text: String,
    /// Completion signal, raised when the countdown reaches zero
    pub alarm_active: bool,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerState {
    /// Creates an idle state.
    pub fn new() -> Self {
        Self {
            total_duration_seconds: 0,
            remaining_seconds: 0,
            is_running: false,
            display_text: format_hms(0),
            alarm_active: false,
        }
    }

    /// Returns the derived phase.
    pub fn phase(&self) -> TimerPhase {
        if self.is_running {
            TimerPhase::Running
        } else if self.total_duration_seconds == 0 {
            TimerPhase::Idle
        } else if self.remaining_seconds == 0 {
            TimerPhase::Completed
        } else if self.remaining_seconds == self.total_duration_seconds {
            TimerPhase::Configured
        } else {
            TimerPhase::Paused
        }
    }

    /// Seconds already counted down.
    pub fn elapsed_seconds(&self) -> u32 {
        self.total_duration_seconds - self.remaining_seconds
    }

    /// Sets a new duration and rewinds the countdown to it.
    pub fn set_total(&mut self, total_seconds: u32) {
        self.total_duration_seconds = total_seconds;
        self.remaining_seconds = total_seconds;
        self.is_running = false;
        self.alarm_active = false;
        self.refresh_display();
    }

    /// Marks the countdown as running.
    ///
    /// Returns false (and changes nothing) when no duration is set or the
    /// countdown is already running. A completed countdown is rewound to the
    /// full duration and its completion signal cleared.
    pub fn begin(&mut self) -> bool {
        if self.total_duration_seconds == 0 || self.is_running {
            return false;
        }
        if self.remaining_seconds == 0 {
            self.remaining_seconds = self.total_duration_seconds;
            self.alarm_active = false;
            self.refresh_display();
        }
        self.is_running = true;
        true
    }

    /// Stops the countdown where it is.
    ///
    /// Returns true if it was running.
    pub fn halt(&mut self) -> bool {
        std::mem::replace(&mut self.is_running, false)
    }

    /// Zeroes everything.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Adds `seconds` to both the duration and the remaining time.
    ///
    /// Elapsed progress is preserved. Extending a completed countdown clears
    /// its completion signal. Returns false on an idle timer, which is left
    /// untouched.
    pub fn extend(&mut self, seconds: u32) -> bool {
        if self.total_duration_seconds == 0 {
            return false;
        }
        let added = seconds.min(u32::MAX - self.total_duration_seconds);
        self.total_duration_seconds += added;
        self.remaining_seconds += added;
        if self.remaining_seconds > 0 {
            self.alarm_active = false;
        }
        self.refresh_display();
        true
    }

    /// Clears the completion signal.
    ///
    /// Returns true if it was raised.
    pub fn dismiss_alarm(&mut self) -> bool {
        std::mem::replace(&mut self.alarm_active, false)
    }

    /// Counts down one second.
    ///
    /// Returns true exactly when this tick brought the countdown to zero; the
    /// state is then no longer running and the completion signal is raised.
    /// Ticks on a stopped countdown are ignored.
    pub fn tick(&mut self) -> bool {
        if !self.is_running {
            return false;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        self.refresh_display();
        if self.remaining_seconds == 0 {
            self.is_running = false;
            self.alarm_active = true;
            return true;
        }
        false
    }

    fn refresh_display(&mut self) {
        self.display_text = format_hms(self.remaining_seconds);
    }
}

// ============================================================================
// Tests
// ============================================================================
