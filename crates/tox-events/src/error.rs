//! Error types for tox-events

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tox_events_core::EventLogError;

/// Sticky error recorded while collecting events during one iteration.
///
/// Handlers never return this. They store it on the
/// [`EventsState`](crate::EventsState) and keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum IterateError {
    /// An event could not be recorded because memory ran out
    #[error("Allocation failure during event iteration")]
    Malloc,
}

/// Top-level error type for tox-events
#[derive(Debug, Error)]
pub enum EventsError {
    #[error("Event log error: {0}")]
    Log(#[from] EventLogError),

    #[error("Event iteration failed: {0}")]
    Iterate(#[from] IterateError),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl EventsError {
    /// Create a new Encode error
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode(message.into())
    }

    /// Create a new Decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

/// Result type alias for tox-events operations
pub type EventsResult<T> = Result<T, EventsError>;
