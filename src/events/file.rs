//! JSON file backed event store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tracing::debug;

use super::error::{EventError, EventResult};
use super::model::Event;
use super::store::{EventCollection, EventStore, Listeners};

/// File name used inside the data directory.
pub const DEFAULT_STORE_FILE: &str = "events.json";

/// Directory name used under the platform data directory.
pub const APP_DIR_NAME: &str = "digital-assistant";

/// Returns `<data dir>/digital-assistant/events.json`, if the platform has a data dir.
pub fn default_store_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME).join(DEFAULT_STORE_FILE))
}

/// Event store persisted as a single JSON document.
///
/// Every operation reads the file, and every mutation rewrites it through a
/// temporary file and a rename. A missing file is an empty collection.
#[derive(Debug)]
pub struct JsonFileEventStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
    listeners: Listeners,
}

impl JsonFileEventStore {
    /// Creates a store backed by `path`. Nothing is touched until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
            listeners: Listeners::default(),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> EventResult<EventCollection> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(EventCollection::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No event store at {}, starting empty", self.path.display());
                Ok(EventCollection::new())
            }
            Err(source) => Err(EventError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    async fn save(&self, collection: &EventCollection) -> EventResult<()> {
        let io_err = |path: &Path, source| EventError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_err(parent, e))?;
        }

        let json = serde_json::to_string_pretty(collection)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| io_err(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_err(&self.path, e))?;

        debug!("Event store saved to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl EventStore for JsonFileEventStore {
    async fn list_events(&self, user_id: &str) -> EventResult<Vec<Event>> {
        if user_id.trim().is_empty() {
            return Err(EventError::InvalidUser);
        }
        let _guard = self.guard.lock().await;
        Ok(self.load().await?.events_for(user_id))
    }

    async fn insert_event(&self, event: Event, user_id: &str) -> EventResult<()> {
        let _guard = self.guard.lock().await;
        let mut collection = self.load().await?;
        collection.insert(user_id, event)?;
        self.save(&collection).await?;
        self.listeners.notify(user_id, collection.events_for(user_id));
        Ok(())
    }

    async fn update_event(
        &self,
        original_title: &str,
        event: Event,
        user_id: &str,
    ) -> EventResult<usize> {
        let _guard = self.guard.lock().await;
        let mut collection = self.load().await?;
        let replaced = collection.update(user_id, original_title, event)?;
        if replaced > 0 {
            self.save(&collection).await?;
            self.listeners.notify(user_id, collection.events_for(user_id));
        }
        Ok(replaced)
    }

    async fn delete_event(&self, title: &str, user_id: &str) -> EventResult<usize> {
        let _guard = self.guard.lock().await;
        let mut collection = self.load().await?;
        let removed = collection.delete(user_id, title)?;
        if removed > 0 {
            self.save(&collection).await?;
            self.listeners.notify(user_id, collection.events_for(user_id));
        }
        Ok(removed)
    }

    async fn observe_events(&self, user_id: &str) -> EventResult<watch::Receiver<Vec<Event>>> {
        let current = self.list_events(user_id).await?;
        Ok(self.listeners.subscribe(user_id, current))
    }

    fn clear_listeners(&self) {
        self.listeners.clear();
    }
}
