//! Command definitions for the assistant CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand};

use crate::events::{Event, MAX_TITLE_LEN};
use crate::types::TimerConfig;

// ============================================================================
// CLI Structure
// ============================================================================

/// Focus timer and event planner
#[derive(Parser, Debug)]
#[command(
    name = "assistant",
    version,
    about = "Focus timer with alarm, plus a small event planner",
    long_about = "Runs a countdown timer with pause, reset and extra time, and \
                  sounds an alarm when it reaches zero.\n\
                  Also keeps a per-user list of calendar events and plans their reminders.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a countdown in this terminal
    Timer(TimerArgs),

    /// Manage calendar events
    Events(EventsArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Timer Command Arguments
// ============================================================================

/// Arguments for the timer command
#[derive(Args, Debug, Clone)]
pub struct TimerArgs {
    /// Hours (0-23)
    #[arg(
        short = 'H',
        long,
        default_value = "0",
        value_parser = clap::value_parser!(u32).range(0..=23)
    )]
    pub hours: u32,

    /// Minutes (0-59)
    #[arg(
        short,
        long,
        default_value = "25",
        value_parser = clap::value_parser!(u32).range(0..=59)
    )]
    pub minutes: u32,

    /// Seconds (0-59)
    #[arg(
        short,
        long,
        default_value = "0",
        value_parser = clap::value_parser!(u32).range(0..=59)
    )]
    pub seconds: u32,

    /// Seconds added by the `e` command (1-3600)
    #[arg(
        short,
        long,
        default_value = "15",
        value_parser = clap::value_parser!(u32).range(1..=3600)
    )]
    pub extra: u32,

    /// Tick period in milliseconds
    #[arg(
        long,
        default_value = "1000",
        hide = true,
        value_parser = clap::value_parser!(u64).range(10..=60_000)
    )]
    pub tick_ms: u64,

    /// Disable the alarm sound
    #[arg(long)]
    pub no_sound: bool,

    /// Audio file to use as the alarm
    #[arg(long, value_name = "FILE", conflicts_with = "no_sound")]
    pub sound: Option<PathBuf>,

    /// Wait for `p` instead of starting right away
    #[arg(long)]
    pub paused: bool,

    /// Exit as soon as the countdown completes
    #[arg(long)]
    pub exit_on_complete: bool,
}

impl Default for TimerArgs {
    fn default() -> Self {
        Self {
            hours: 0,
            minutes: 25,
            seconds: 0,
            extra: 15,
            tick_ms: 1000,
            no_sound: false,
            sound: None,
            paused: false,
            exit_on_complete: false,
        }
    }
}

impl TimerArgs {
    /// Builds the timer configuration these arguments describe.
    pub fn to_config(&self) -> TimerConfig {
        let config = TimerConfig::default()
            .with_tick_interval_ms(self.tick_ms)
            .with_extra_time_seconds(self.extra)
            .with_sound_enabled(!self.no_sound);
        match &self.sound {
            Some(path) => config.with_alarm_sound(path),
            None => config,
        }
    }
}

// ============================================================================
// Events Command Arguments
// ============================================================================

/// Arguments for the events command
#[derive(Args, Debug, Clone)]
pub struct EventsArgs {
    /// Event store file (defaults to the platform data directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Event operation
    #[command(subcommand)]
    pub command: EventCommands,
}

/// Event operations
#[derive(Subcommand, Debug, Clone)]
pub enum EventCommands {
    /// List a user's events, earliest first
    List {
        /// User id
        #[arg(short, long)]
        user: String,
    },

    /// Add an event
    Add {
        /// User id
        #[arg(short, long)]
        user: String,

        #[command(flatten)]
        fields: EventFields,
    },

    /// Replace every event with the given title
    Update {
        /// User id
        #[arg(short, long)]
        user: String,

        /// Title of the event(s) to replace
        #[arg(long, value_name = "TITLE")]
        original: String,

        #[command(flatten)]
        fields: EventFields,
    },

    /// Delete every event with the given title
    Delete {
        /// User id
        #[arg(short, long)]
        user: String,

        /// Title of the event(s) to delete
        #[arg(short, long)]
        title: String,
    },

    /// Show upcoming reminders for events with an alarm
    Reminders {
        /// User id
        #[arg(short, long)]
        user: String,
    },
}

/// Fields describing one event
#[derive(Args, Debug, Clone)]
pub struct EventFields {
    /// Event title
    #[arg(short, long, value_parser = validate_title)]
    pub title: String,

    /// Date and time, RFC 3339 or `YYYY-MM-DD HH:MM` (UTC)
    #[arg(short, long, value_parser = parse_event_date)]
    pub date: DateTime<Utc>,

    /// Description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Location
    #[arg(long, default_value = "")]
    pub location: String,

    /// Plan reminders for this event
    #[arg(short, long)]
    pub alarm: bool,
}

impl EventFields {
    /// Builds the event record.
    pub fn to_event(&self) -> Event {
        Event::new(self.title.clone(), self.date)
            .with_description(self.description.clone())
            .with_location(self.location.clone())
            .with_alarm(self.alarm)
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates an event title.
///
/// - Must not be blank
/// - Must not exceed `MAX_TITLE_LEN` characters
fn validate_title(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("title must not be empty".to_string());
    }
    if s.chars().count() > MAX_TITLE_LEN {
        return Err(format!("title must be at most {} characters", MAX_TITLE_LEN));
    }
    Ok(s.to_string())
}

/// Parses an RFC 3339 timestamp or a `YYYY-MM-DD HH:MM` UTC time.
fn parse_event_date(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
        .map(|naive| naive.and_utc())
        .map_err(|_| format!("invalid date '{}': use RFC 3339 or YYYY-MM-DD HH:MM", s))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    mod timer_args_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let cli = Cli::parse_from(["assistant", "timer"]);
            match cli.command {
                Some(Commands::Timer(args)) => {
                    assert_eq!(args.hours, 0);
                    assert_eq!(args.minutes, 25);
                    assert_eq!(args.seconds, 0);
                    assert_eq!(args.extra, 15);
                    assert!(!args.paused);
                }
                _ => panic!("Expected Timer command"),
            }
        }

        #[test]
        fn test_all_options() {
            let cli = Cli::parse_from([
                "assistant",
                "timer",
                "-H",
                "1",
                "-m",
                "2",
                "-s",
                "3",
                "--extra",
                "30",
                "--no-sound",
                "--exit-on-complete",
            ]);
            match cli.command {
                Some(Commands::Timer(args)) => {
                    assert_eq!((args.hours, args.minutes, args.seconds), (1, 2, 3));
                    assert_eq!(args.extra, 30);
                    assert!(args.no_sound);
                    assert!(args.exit_on_complete);
                }
                _ => panic!("Expected Timer command"),
            }
        }

        #[test]
        fn test_out_of_range_rejected() {
            assert!(Cli::try_parse_from(["assistant", "timer", "-H", "24"]).is_err());
            assert!(Cli::try_parse_from(["assistant", "timer", "-m", "60"]).is_err());
            assert!(Cli::try_parse_from(["assistant", "timer", "-s", "60"]).is_err());
            assert!(Cli::try_parse_from(["assistant", "timer", "--extra", "0"]).is_err());
        }

        #[test]
        fn test_sound_conflicts_with_no_sound() {
            let result = Cli::try_parse_from([
                "assistant",
                "timer",
                "--no-sound",
                "--sound",
                "bell.wav",
            ]);
            assert!(result.is_err());
        }

        #[test]
        fn test_to_config() {
            let args = TimerArgs {
                extra: 60,
                no_sound: true,
                tick_ms: 500,
                ..TimerArgs::default()
            };
            let config = args.to_config();
            assert_eq!(config.extra_time_seconds, 60);
            assert_eq!(config.tick_interval_ms, 500);
            assert!(!config.sound_enabled);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_to_config_with_sound_file() {
            let args = TimerArgs {
                sound: Some(PathBuf::from("bell.ogg")),
                ..TimerArgs::default()
            };
            assert_eq!(args.to_config().alarm_sound, Some(PathBuf::from("bell.ogg")));
        }
    }

    mod events_args_tests {
        use super::*;

        #[test]
        fn test_add() {
            let cli = Cli::parse_from([
                "assistant",
                "events",
                "--store",
                "/tmp/ev.json",
                "add",
                "-u",
                "alice",
                "-t",
                "Dentist",
                "-d",
                "2026-03-14 09:30",
                "--alarm",
            ]);
            match cli.command {
                Some(Commands::Events(EventsArgs {
                    store,
                    command: EventCommands::Add { user, fields },
                })) => {
                    assert_eq!(store, Some(PathBuf::from("/tmp/ev.json")));
                    assert_eq!(user, "alice");
                    let event = fields.to_event();
                    assert_eq!(event.title, "Dentist");
                    assert!(event.alarm);
                    assert_eq!(
                        event.event_date,
                        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
                    );
                }
                other => panic!("Expected events add, got {:?}", other),
            }
        }

        #[test]
        fn test_store_after_subcommand() {
            let cli = Cli::parse_from([
                "assistant",
                "events",
                "list",
                "-u",
                "bob",
                "--store",
                "x.json",
            ]);
            match cli.command {
                Some(Commands::Events(args)) => {
                    assert_eq!(args.store, Some(PathBuf::from("x.json")));
                }
                _ => panic!("Expected events command"),
            }
        }

        #[test]
        fn test_add_rejects_blank_title() {
            let result = Cli::try_parse_from([
                "assistant", "events", "add", "-u", "a", "-t", "  ", "-d", "2026-01-01 00:00",
            ]);
            assert!(result.is_err());
        }

        #[test]
        fn test_update_requires_original() {
            let result = Cli::try_parse_from([
                "assistant", "events", "update", "-u", "a", "-t", "New", "-d", "2026-01-01 00:00",
            ]);
            assert!(result.is_err());
        }
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_rfc3339() {
            let date = parse_event_date("2026-03-14T09:30:00+02:00").unwrap();
            assert_eq!(date, Utc.with_ymd_and_hms(2026, 3, 14, 7, 30, 0).unwrap());
        }

        #[test]
        fn test_parse_short_form() {
            let date = parse_event_date("2026-12-31 23:59").unwrap();
            assert_eq!(date, Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 0).unwrap());
        }

        #[test]
        fn test_parse_invalid() {
            assert!(parse_event_date("tomorrow").is_err());
            assert!(parse_event_date("2026-13-01 10:00").is_err());
        }

        #[test]
        fn test_validate_title() {
            assert!(validate_title("Lunch").is_ok());
            assert!(validate_title("").is_err());
            assert!(validate_title(&"x".repeat(MAX_TITLE_LEN + 1)).is_err());
        }
    }
}
