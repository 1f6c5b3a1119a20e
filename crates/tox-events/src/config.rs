//! Configuration for event collection

use serde::{Deserialize, Serialize};
use tox_events_core::MemoryBudget;

/// What to do when a record was appended but its payload could not be copied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PayloadFailurePolicy {
    /// Keep the record with an empty payload and leave the iteration clean
    #[default]
    Tolerate,
    /// Keep the record with an empty payload and set the sticky error
    Escalate,
}

/// Event collection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Handling of payload copy-in failures
    pub payload_failure: PayloadFailurePolicy,
    /// Record ceiling per event kind
    pub max_records: u32,
    /// Byte budget shared by every log in one container (unbounded if `None`)
    pub memory: Option<MemoryBudget>,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            payload_failure: PayloadFailurePolicy::Tolerate,
            max_records: u32::MAX,
            memory: None,
        }
    }
}

impl EventsConfig {
    /// Config that reports every lost byte through the sticky error
    pub fn strict() -> Self {
        Self {
            payload_failure: PayloadFailurePolicy::Escalate,
            ..Default::default()
        }
    }

    /// Config for memory-constrained hosts
    pub fn constrained(budget: MemoryBudget) -> Self {
        Self {
            memory: Some(budget),
            ..Default::default()
        }
    }

    /// Set the payload failure policy
    pub fn with_payload_failure(mut self, policy: PayloadFailurePolicy) -> Self {
        self.payload_failure = policy;
        self
    }

    /// Set the record ceiling per event kind
    pub fn with_max_records(mut self, max_records: u32) -> Self {
        self.max_records = max_records;
        self
    }

    /// Set the shared memory budget
    pub fn with_memory_budget(mut self, budget: MemoryBudget) -> Self {
        self.memory = Some(budget);
        self
    }
}
