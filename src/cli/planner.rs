//! `events` subcommand handlers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::debug;

use crate::events::{default_store_path, plan_all, EventStore, JsonFileEventStore};

use super::commands::{EventCommands, EventsArgs};
use super::display::Display;

/// Resolves the store path from `--store` or the platform data directory.
///
/// # Errors
///
/// Returns an error when no `--store` was given and the platform has no
/// data directory.
pub fn resolve_store_path(explicit: Option<&PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.clone()),
        None => default_store_path().context("No data directory found; pass --store <FILE>"),
    }
}

/// Runs an `events` subcommand against the JSON file store.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written, or the input
/// fails validation.
pub async fn run_events(args: &EventsArgs) -> Result<()> {
    let path = resolve_store_path(args.store.as_ref())?;
    let store = JsonFileEventStore::new(path);
    debug!("Using event store {}", store.path().display());
    execute(&store, &args.command).await
}

/// Runs an `events` subcommand against any store.
///
/// # Errors
///
/// Propagates store errors with context.
pub async fn execute(store: &dyn EventStore, command: &EventCommands) -> Result<()> {
    match command {
        EventCommands::List { user } => {
            let events = store
                .list_events(user)
                .await
                .context("Failed to list events")?;
            Display::show_events(user, &events);
        }
        EventCommands::Add { user, fields } => {
            let event = fields.to_event();
            store
                .insert_event(event.clone(), user)
                .await
                .context("Failed to add event")?;
            Display::show_event_added(&event);
        }
        EventCommands::Update {
            user,
            original,
            fields,
        } => {
            let count = store
                .update_event(original, fields.to_event(), user)
                .await
                .context("Failed to update event")?;
            Display::show_events_updated(original, count);
        }
        EventCommands::Delete { user, title } => {
            let count = store
                .delete_event(title, user)
                .await
                .context("Failed to delete event")?;
            Display::show_events_deleted(title, count);
        }
        EventCommands::Reminders { user } => {
            let events = store
                .list_events(user)
                .await
                .context("Failed to list events")?;
            Display::show_reminders(&plan_all(&events, Utc::now()));
        }
    }
    Ok(())
}
