//! # Tox Events
//!
//! Collects Tox protocol callbacks into event logs that can be read after
//! the iteration that produced them.
//!
//! During an iteration the protocol layer calls [`ToxCallbacks`] methods on
//! an [`EventsState`]. Each call appends a record to the matching
//! [`EventLog`](tox_events_core::EventLog) and copies any borrowed bytes in.
//! Allocation failures are recorded as a sticky [`IterateError`] instead of
//! aborting the iteration.
//!
//! ## Example
//!
//! ```
//! use tox_events::{ConferenceType, EventsConfig, EventsState, FriendNumber};
//!
//! let iteration = EventsState::iterate(EventsConfig::default(), false, |state| {
//!     state.handle_conference_invite(FriendNumber(7), ConferenceType::Text, &[0xAA, 0xBB, 0xCC]);
//! });
//!
//! let mut events = iteration.events.unwrap();
//! let invite = events.conference_invite(0);
//! assert_eq!(invite.friend_number(), FriendNumber(7));
//! assert_eq!(invite.cookie(), &[0xAA, 0xBB, 0xCC]);
//!
//! events.clear();
//! assert_eq!(events.conference_invite_size(), 0);
//! ```

pub mod conference_invite;
pub mod config;
pub mod error;
pub mod events;
pub mod state;
pub mod wire;

pub use conference_invite::{ConferenceInvite, ConferenceType, FriendNumber};
pub use config::{EventsConfig, PayloadFailurePolicy};
pub use error::{EventsError, EventsResult, IterateError};
pub use events::ToxEvents;
pub use state::{EventsState, Iteration, ToxCallbacks};
pub use wire::SNAPSHOT_VERSION;
