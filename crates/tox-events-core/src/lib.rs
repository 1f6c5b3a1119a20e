//! # Tox Events Core
//!
//! Growable, append-only logs of event records with owned payloads.
//!
//! A network callback appends one record per occurrence and copies its
//! borrowed bytes in. A consumer later reads the records by index and clears
//! the log, which frees every payload along with the backing store.
//!
//! ## Key Types
//!
//! - [`EventLog`]: Indexed log of one record kind with `2c + 1` growth
//! - [`Record`]: Trait implemented by each event kind
//! - [`Payload`]: Owned byte buffer held by a record
//! - [`Allocator`]: Charges allocations against an optional [`MemoryBudget`]
//!
//! ## Example
//!
//! ```
//! use tox_events_core::{EventLog, Payload, Record};
//!
//! #[derive(Debug, Default)]
//! struct Ping {
//!     peer: u32,
//!     data: Payload,
//! }
//!
//! impl Record for Ping {
//!     const KIND: &'static str = "ping";
//! }
//!
//! let mut log: EventLog<Ping> = EventLog::new();
//! let index = log.append().unwrap();
//! let (ping, allocator) = log.entry(index).into_parts();
//! ping.peer = 7;
//! ping.data.assign(&[0xAA, 0xBB, 0xCC], allocator).unwrap();
//!
//! assert_eq!(log.get(0).data.as_slice(), &[0xAA, 0xBB, 0xCC]);
//! log.clear();
//! assert_eq!(log.size(), 0);
//! ```

pub mod error;
pub mod event_log;
pub mod memory;
pub mod payload;
pub mod record;

pub use error::*;
pub use event_log::{Entry, EventLog};
pub use memory::{Allocator, MemoryBudget, MemoryTracker, Reservation};
pub use payload::Payload;
pub use record::Record;
