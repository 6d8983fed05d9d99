//! CLI module for the assistant.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `session`: Interactive countdown driving the timer manager
//! - `planner`: Handlers for the `events` subcommands
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod display;
pub mod planner;
pub mod session;

pub use commands::{Cli, Commands, EventCommands, EventFields, EventsArgs, TimerArgs};
pub use display::Display;
pub use planner::run_events;
pub use session::{run_timer, SessionCommand};
