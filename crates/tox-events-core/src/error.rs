//! Error types for tox-events-core

use thiserror::Error;

/// Errors returned by event log operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventLogError {
    /// The log already holds as many records as its index space allows
    #[error("Event count exhausted: log already holds {limit} records")]
    CountExhausted { limit: u32 },

    /// Backing storage or a payload buffer could not be allocated
    #[error("Allocation failure: {0}")]
    AllocationFailure(#[from] AllocError),
}

impl EventLogError {
    /// Whether this error means the log can never accept another record
    pub fn is_count_exhausted(&self) -> bool {
        matches!(self, Self::CountExhausted { .. })
    }

    /// Whether this error came from a failed or refused allocation
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, Self::AllocationFailure(_))
    }
}

/// Reasons an allocation can fail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("Memory budget exceeded: requested {requested} bytes, available {available}")]
    BudgetExceeded { requested: usize, available: usize },

    #[error("Payload too large: {size} bytes exceeds limit of {limit}")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Out of memory: could not allocate {requested} bytes")]
    OutOfMemory { requested: usize },
}

/// Result type alias for event log operations
pub type EventLogResult<T> = Result<T, EventLogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_exhausted_display() {
        let err = EventLogError::CountExhausted { limit: u32::MAX };
        let msg = format!("{}", err);
        assert!(msg.contains("exhausted"));
        assert!(msg.contains(&u32::MAX.to_string()));
        assert!(err.is_count_exhausted());
        assert!(!err.is_allocation_failure());
    }

    #[test]
    fn test_alloc_error_display() {
        let err = AllocError::BudgetExceeded {
            requested: 2048,
            available: 512,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("2048"));
        assert!(msg.contains("512"));

        let err = AllocError::PayloadTooLarge { size: 300, limit: 256 };
        assert!(format!("{}", err).contains("too large"));

        let err = AllocError::OutOfMemory { requested: 64 };
        assert!(format!("{}", err).contains("64"));
    }

    #[test]
    fn test_alloc_error_converts() {
        let err: EventLogError = AllocError::OutOfMemory { requested: 1 }.into();
        assert!(err.is_allocation_failure());
        assert!(format!("{}", err).contains("Allocation failure"));
    }
}
