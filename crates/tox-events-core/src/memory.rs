//! # Memory budgets
//!
//! Byte accounting for event logs running on constrained hosts.
//!
//! Every allocation an [`EventLog`](crate::EventLog) makes, whether backing
//! slots or payload buffers, is first charged to an [`Allocator`]. An
//! unbounded allocator charges nothing. A budgeted allocator forwards the
//! charge to a shared [`MemoryTracker`] and hands back a [`Reservation`] that
//! returns the bytes when dropped.
//!
//! ## Example
//!
//! ```
//! use tox_events_core::memory::{Allocator, MemoryBudget};
//!
//! let allocator = Allocator::with_budget(MemoryBudget::minimal());
//! let tracker = allocator.tracker().unwrap().clone();
//!
//! let reservation = allocator.reserve(1024).unwrap();
//! assert_eq!(tracker.allocated_bytes(), 1024);
//!
//! drop(reservation);
//! assert_eq!(tracker.allocated_bytes(), 0);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::AllocError;

/// Memory budget configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryBudget {
    /// Maximum bytes held by all logs sharing the budget
    pub max_heap_bytes: usize,
    /// Maximum size of a single payload
    pub max_payload_size: usize,
}

impl Default for MemoryBudget {
    fn default() -> Self {
        Self {
            max_heap_bytes: 1024 * 1024, // 1MB
            max_payload_size: 64 * 1024,
        }
    }
}

impl MemoryBudget {
    /// Budget for very constrained devices
    pub fn minimal() -> Self {
        Self {
            max_heap_bytes: 16 * 1024, // 16KB
            max_payload_size: 256,
        }
    }

    /// Budget for moderate devices
    pub fn moderate() -> Self {
        Self {
            max_heap_bytes: 128 * 1024, // 128KB
            max_payload_size: 4096,
        }
    }

    /// Budget that never refuses a charge
    pub fn unbounded() -> Self {
        Self {
            max_heap_bytes: usize::MAX,
            max_payload_size: usize::MAX,
        }
    }
}

/// Tracks bytes charged against a [`MemoryBudget`].
///
/// Charges use compare-and-swap so several logs can share one tracker
/// through `Arc<MemoryTracker>`.
#[derive(Debug)]
pub struct MemoryTracker {
    budget: MemoryBudget,
    allocated: AtomicUsize,
    peak: AtomicUsize,
}

impl MemoryTracker {
    /// Create a new tracker with the given budget
    pub fn new(budget: MemoryBudget) -> Self {
        Self {
            budget,
            allocated: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Try to charge `bytes` against the budget.
    ///
    /// Returns a reservation that gives the bytes back when dropped.
    pub fn try_reserve(self: &Arc<Self>, bytes: usize) -> Result<Reservation, AllocError> {
        loop {
            let current = self.allocated.load(Ordering::Acquire);

            let new_value = match current.checked_add(bytes) {
                Some(v) if v <= self.budget.max_heap_bytes => v,
                _ => {
                    return Err(AllocError::BudgetExceeded {
                        requested: bytes,
                        available: self.budget.max_heap_bytes.saturating_sub(current),
                    });
                }
            };

            match self.allocated.compare_exchange_weak(
                current,
                new_value,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.peak.fetch_max(new_value, Ordering::Relaxed);
                    return Ok(Reservation {
                        tracker: Some(Arc::clone(self)),
                        bytes,
                    });
                }
                Err(_) => continue,
            }
        }
    }

    /// Check a payload length against the per-payload limit
    pub fn check_payload_size(&self, size: usize) -> Result<(), AllocError> {
        if size > self.budget.max_payload_size {
            return Err(AllocError::PayloadTooLarge {
                size,
                limit: self.budget.max_payload_size,
            });
        }
        Ok(())
    }

    /// Bytes currently charged
    pub fn allocated_bytes(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }

    /// Bytes still available under the budget
    pub fn available_bytes(&self) -> usize {
        self.budget
            .max_heap_bytes
            .saturating_sub(self.allocated.load(Ordering::Relaxed))
    }

    /// Highest number of bytes ever charged at once
    pub fn peak_bytes(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }

    /// Get the budget
    pub fn budget(&self) -> &MemoryBudget {
        &self.budget
    }
}

/// Bytes charged against a tracker.
///
/// Dropping the reservation returns its bytes. The default reservation is
/// untracked and holds zero bytes.
#[derive(Debug, Default)]
pub struct Reservation {
    tracker: Option<Arc<MemoryTracker>>,
    bytes: usize,
}

impl Reservation {
    /// Number of bytes held
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// Fold another reservation from the same tracker into this one
    pub fn merge(&mut self, mut other: Reservation) {
        if other.bytes == 0 {
            return;
        }
        if let (Some(mine), Some(theirs)) = (&self.tracker, &other.tracker) {
            debug_assert!(Arc::ptr_eq(mine, theirs), "merging reservations across trackers");
        }
        if self.tracker.is_none() {
            self.tracker = other.tracker.take();
        }
        self.bytes += other.bytes;
        other.bytes = 0;
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if let Some(tracker) = &self.tracker {
            let prev = tracker.allocated.fetch_sub(self.bytes, Ordering::AcqRel);
            debug_assert!(
                prev >= self.bytes,
                "Reservation underflow: had {}, subtracting {}",
                prev,
                self.bytes
            );
        }
    }
}

/// Allocation handle shared by a log and the payloads it owns.
///
/// Cloning is cheap. Clones charge the same tracker.
#[derive(Debug, Clone, Default)]
pub struct Allocator {
    tracker: Option<Arc<MemoryTracker>>,
}

impl Allocator {
    /// Allocator with no budget
    pub fn unbounded() -> Self {
        Self { tracker: None }
    }

    /// Allocator with a fresh tracker for `budget`
    pub fn with_budget(budget: MemoryBudget) -> Self {
        Self::shared(Arc::new(MemoryTracker::new(budget)))
    }

    /// Allocator charging an existing tracker
    pub fn shared(tracker: Arc<MemoryTracker>) -> Self {
        Self {
            tracker: Some(tracker),
        }
    }

    /// The tracker behind this allocator, if budgeted
    pub fn tracker(&self) -> Option<&Arc<MemoryTracker>> {
        self.tracker.as_ref()
    }

    /// Charge `bytes` of backing storage
    pub fn reserve(&self, bytes: usize) -> Result<Reservation, AllocError> {
        match &self.tracker {
            Some(tracker) if bytes > 0 => tracker.try_reserve(bytes),
            _ => Ok(Reservation::default()),
        }
    }

    /// Charge a payload buffer of `size` bytes
    pub fn reserve_payload(&self, size: usize) -> Result<Reservation, AllocError> {
        if let Some(tracker) = &self.tracker {
            tracker.check_payload_size(size)?;
        }
        self.reserve(size)
    }
}
