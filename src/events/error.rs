//! Event data-access error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by an [`EventStore`](super::EventStore).
#[derive(Debug, Error)]
pub enum EventError {
    /// The event failed validation.
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// The user id was empty.
    #[error("user id must not be empty")]
    InvalidUser,

    /// Reading or writing the backing file failed.
    #[error("event store I/O error at {}: {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not valid JSON for an event collection.
    #[error("event store is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EventError {
    /// Returns true if the caller sent bad input, as opposed to a storage failure.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::InvalidEvent(_) | Self::InvalidUser)
    }
}

/// Result type for event data access.
pub type EventResult<T> = Result<T, EventError>;
