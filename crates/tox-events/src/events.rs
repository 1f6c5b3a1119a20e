//! Event container
//!
//! [`ToxEvents`] holds one [`EventLog`] per event kind, all charging the
//! same allocator.

use std::sync::Arc;

use tox_events_core::{Allocator, Entry, EventLog, EventLogError, MemoryTracker};

use crate::config::EventsConfig;
use crate::conference_invite::ConferenceInvite;

/// Events collected during one iteration
#[derive(Debug, Default)]
pub struct ToxEvents {
    conference_invite: EventLog<ConferenceInvite>,
}

impl ToxEvents {
    /// Create an empty, unbudgeted container
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty container configured by `config`
    pub fn with_config(config: &EventsConfig) -> Self {
        let allocator = match config.memory {
            Some(budget) => Allocator::with_budget(budget),
            None => Allocator::unbounded(),
        };
        Self {
            conference_invite: EventLog::with_allocator(allocator)
                .with_max_records(config.max_records),
        }
    }

    /// Total number of events across all kinds
    pub fn size(&self) -> u32 {
        self.conference_invite.size()
    }

    /// True if no events were collected
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Number of conference invites
    pub fn conference_invite_size(&self) -> u32 {
        self.conference_invite.size()
    }

    /// Conference invite at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.conference_invite_size()`.
    pub fn conference_invite(&self, index: u32) -> &ConferenceInvite {
        self.conference_invite.get(index)
    }

    /// The conference invite log
    pub fn conference_invites(&self) -> &EventLog<ConferenceInvite> {
        &self.conference_invite
    }

    pub(crate) fn add_conference_invite(&mut self) -> Result<u32, EventLogError> {
        self.conference_invite.append()
    }

    pub(crate) fn conference_invite_entry(&mut self, index: u32) -> Entry<'_, ConferenceInvite> {
        self.conference_invite.entry(index)
    }

    /// Payload bytes owned across all kinds
    pub fn payload_bytes(&self) -> usize {
        self.conference_invite.payload_bytes()
    }

    /// Memory tracker shared by every log, if budgeted
    pub fn memory_tracker(&self) -> Option<&Arc<MemoryTracker>> {
        self.conference_invite.allocator().tracker()
    }

    /// Drop every event of every kind
    pub fn clear(&mut self) {
        self.conference_invite.clear();
    }
}
