//! Interactive countdown in the terminal.
//!
//! The session owns a [`TimerManager`] for its whole lifetime, renders every
//! timer event, and turns single-letter stdin lines into timer operations.

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::sound;
use crate::timer::{TimerEvent, TimerManager};

use super::commands::TimerArgs;
use super::display::Display;

// ============================================================================
// SessionCommand
// ============================================================================

/// Commands accepted on stdin during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Start when stopped, pause when running
    Toggle,
    /// Add the configured extra time
    Extra,
    /// Reset to idle
    Reset,
    /// Dismiss the alarm
    Dismiss,
    /// Print the full state
    Status,
    /// End the session
    Quit,
}

impl SessionCommand {
    /// Parses one input line. Accepts the first letter or the full word.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "p" | "pause" | "start" | "toggle" => Some(Self::Toggle),
            "e" | "extra" => Some(Self::Extra),
            "r" | "reset" => Some(Self::Reset),
            "d" | "dismiss" => Some(Self::Dismiss),
            "s" | "status" => Some(Self::Status),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Applies a command to the manager.
///
/// Returns false when the session should end.
pub fn apply(manager: &mut TimerManager, command: SessionCommand) -> bool {
    debug!("Session command: {:?}", command);
    match command {
        SessionCommand::Toggle => manager.toggle(),
        SessionCommand::Extra => manager.add_configured_extra_time(),
        SessionCommand::Reset => manager.reset_timer(),
        SessionCommand::Dismiss => manager.dismiss_alarm(),
        SessionCommand::Status => Display::show_timer_state(&manager.state()),
        SessionCommand::Quit => return false,
    }
    true
}

// ============================================================================
// Session loop
// ============================================================================

/// Runs a countdown until the user quits, Ctrl-C, or (with
/// `--exit-on-complete`) the countdown completes.
///
/// # Errors
///
/// Returns an error if the arguments describe an invalid configuration or
/// a zero duration.
pub async fn run_timer(args: &TimerArgs) -> Result<()> {
    let config = args.to_config();
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid timer configuration")?;

    if args.hours == 0 && args.minutes == 0 && args.seconds == 0 {
        bail!("Duration must be greater than zero");
    }

    let alarm = sound::try_create_player(&config);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut manager = TimerManager::new(config, event_tx, alarm);

    Display::show_timer_help(manager.config().extra_time_seconds);
    manager.set_time(args.hours, args.minutes, args.seconds);
    if !args.paused {
        manager.start();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match SessionCommand::parse(&line) {
                    Some(command) => {
                        if !apply(&mut manager, command) {
                            break;
                        }
                    }
                    None => Display::show_unknown_command(&line),
                },
                Ok(None) => {
                    debug!("stdin closed, commands disabled");
                    stdin_open = false;
                }
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    stdin_open = false;
                }
            },
            Some(event) = event_rx.recv() => {
                Display::show_timer_event(&event);
                if event == TimerEvent::Completed && args.exit_on_complete {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted");
                break;
            }
        }
    }

    manager.clear();
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
