//! Callback-side collection state
//!
//! The protocol layer drives an iteration and reports each occurrence
//! through [`ToxCallbacks`]. [`EventsState`] turns those calls into records.
//! A failure to record an event never interrupts the iteration. It is
//! stored as a sticky [`IterateError`] and surfaced by
//! [`EventsState::finish`].

use tracing::{debug, trace, warn};

use tox_events_core::Record;

use crate::config::{EventsConfig, PayloadFailurePolicy};
use crate::conference_invite::{ConferenceInvite, ConferenceType, FriendNumber};
use crate::error::{EventsError, IterateError};
use crate::events::ToxEvents;

/// Callbacks invoked by the protocol layer during an iteration
pub trait ToxCallbacks {
    /// A friend invited us to a conference. `cookie` is only valid for the
    /// duration of the call.
    fn on_conference_invite(
        &mut self,
        friend_number: FriendNumber,
        conference_type: ConferenceType,
        cookie: &[u8],
    );
}

/// Outcome of one iteration
#[derive(Debug)]
pub struct Iteration {
    /// Collected events, `None` if nothing was recorded or they were discarded
    pub events: Option<ToxEvents>,
    /// Sticky error raised during the iteration
    pub error: Option<IterateError>,
}

impl Iteration {
    /// Treat any sticky error as a failure
    pub fn into_result(self) -> Result<Option<ToxEvents>, EventsError> {
        match self.error {
            Some(err) => Err(err.into()),
            None => Ok(self.events),
        }
    }
}

/// Mutable state shared by all handlers of one iteration
#[derive(Debug, Default)]
pub struct EventsState {
    config: EventsConfig,
    events: Option<ToxEvents>,
    error: Option<IterateError>,
}

impl EventsState {
    /// Create a state with no events allocated yet
    pub fn new(config: EventsConfig) -> Self {
        Self {
            config,
            events: None,
            error: None,
        }
    }

    /// Run `dispatch` against a fresh state and collect the result.
    ///
    /// With `fail_hard`, any sticky error discards the collected events.
    pub fn iterate<F>(config: EventsConfig, fail_hard: bool, dispatch: F) -> Iteration
    where
        F: FnOnce(&mut EventsState),
    {
        let mut state = Self::new(config);
        dispatch(&mut state);
        state.finish(fail_hard)
    }

    /// Configuration applied to the events this state allocates
    pub fn config(&self) -> &EventsConfig {
        &self.config
    }

    /// Events collected so far, if any were allocated
    pub fn events(&self) -> Option<&ToxEvents> {
        self.events.as_ref()
    }

    /// The events container, allocating it on first use
    pub fn alloc_events(&mut self) -> &mut ToxEvents {
        let config = &self.config;
        self.events
            .get_or_insert_with(|| ToxEvents::with_config(config))
    }

    /// Sticky error, if any handler failed
    pub fn error(&self) -> Option<IterateError> {
        self.error
    }

    /// True once any handler recorded an error
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    fn record_error(&mut self, err: IterateError) {
        // First error wins
        self.error.get_or_insert(err);
    }

    /// Record a conference invite, copying `cookie`.
    ///
    /// If the invite cannot be appended, it is dropped and the sticky error
    /// is set. Whether a failed cookie copy also sets it depends on
    /// [`PayloadFailurePolicy`].
    pub fn handle_conference_invite(
        &mut self,
        friend_number: FriendNumber,
        conference_type: ConferenceType,
        cookie: &[u8],
    ) {
        let policy = self.config.payload_failure;
        let events = self.alloc_events();

        let index = match events.add_conference_invite() {
            Ok(index) => index,
            Err(err) => {
                warn!(
                    kind = ConferenceInvite::KIND,
                    friend = %friend_number,
                    error = %err,
                    "Dropped event"
                );
                self.record_error(IterateError::Malloc);
                return;
            }
        };

        let (invite, allocator) = events.conference_invite_entry(index).into_parts();
        invite.set_friend_number(friend_number);
        invite.set_conference_type(conference_type);
        let stored = invite.set_cookie(cookie, allocator);

        match stored {
            Ok(()) => {
                trace!(
                    kind = ConferenceInvite::KIND,
                    index,
                    friend = %friend_number,
                    conference_type = %conference_type,
                    cookie = %invite.cookie_short(),
                    "Recorded event"
                );
            }
            Err(err) => match policy {
                PayloadFailurePolicy::Tolerate => {
                    debug!(
                        kind = ConferenceInvite::KIND,
                        index,
                        error = %err,
                        "Recorded event without payload"
                    );
                }
                PayloadFailurePolicy::Escalate => {
                    warn!(
                        kind = ConferenceInvite::KIND,
                        index,
                        error = %err,
                        "Payload copy failed"
                    );
                    self.record_error(IterateError::Malloc);
                }
            },
        }
    }

    /// End the iteration, handing back the events and the sticky error.
    ///
    /// Leaves the state empty and clean for the next iteration.
    pub fn finish(&mut self, fail_hard: bool) -> Iteration {
        let events = self.events.take();
        let error = self.error.take();

        if fail_hard && error.is_some() {
            if let Some(discarded) = &events {
                debug!(discarded = discarded.size(), "Discarded events after failed iteration");
            }
            return Iteration {
                events: None,
                error,
            };
        }

        Iteration { events, error }
    }

    /// Drop collected events. No-op if none were allocated.
    pub fn clear(&mut self) {
        if let Some(events) = self.events.as_mut() {
            events.clear();
        }
    }
}

impl ToxCallbacks for EventsState {
    fn on_conference_invite(
        &mut self,
        friend_number: FriendNumber,
        conference_type: ConferenceType,
        cookie: &[u8],
    ) {
        self.handle_conference_invite(friend_number, conference_type, cookie);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tox_events_core::MemoryBudget;

    fn tight_payload_config(policy: PayloadFailurePolicy) -> EventsConfig {
        EventsConfig::constrained(MemoryBudget {
            max_heap_bytes: 64 * 1024,
            max_payload_size: 4,
        })
        .with_payload_failure(policy)
    }

    #[test]
    fn test_events_use_state_config() {
        let state = EventsState::new(EventsConfig::strict().with_max_records(3));
        assert_eq!(state.config().max_records, 3);
        assert_eq!(state.config().payload_failure, PayloadFailurePolicy::Escalate);
    }

    #[test]
    fn test_events_allocated_lazily() {
        let mut state = EventsState::default();
        assert!(state.events().is_none());
        state.clear();
        assert!(state.events().is_none());

        state.handle_conference_invite(FriendNumber(1), ConferenceType::Text, b"c");
        assert_eq!(state.events().unwrap().conference_invite_size(), 1);
    }

    #[test]
    fn test_handler_records_fields() {
        let mut state = EventsState::default();
        state.handle_conference_invite(FriendNumber(7), ConferenceType::Av, &[0xAA, 0xBB, 0xCC]);

        let invite = state.events().unwrap().conference_invite(0);
        assert_eq!(invite.friend_number(), FriendNumber(7));
        assert_eq!(invite.conference_type(), ConferenceType::Av);
        assert_eq!(invite.cookie(), &[0xAA, 0xBB, 0xCC]);
        assert!(!state.is_degraded());
    }

    #[test]
    fn test_dropped_event_sets_sticky_error() {
        let mut state = EventsState::new(EventsConfig::default().with_max_records(1));
        state.handle_conference_invite(FriendNumber(1), ConferenceType::Text, b"a");
        state.handle_conference_invite(FriendNumber(2), ConferenceType::Text, b"b");

        assert_eq!(state.error(), Some(IterateError::Malloc));
        assert_eq!(state.events().unwrap().conference_invite_size(), 1);
        assert_eq!(
            state.events().unwrap().conference_invite(0).friend_number(),
            FriendNumber(1)
        );
    }

    #[test]
    fn test_tolerated_payload_failure() {
        let mut state = EventsState::new(tight_payload_config(PayloadFailurePolicy::Tolerate));
        state.handle_conference_invite(FriendNumber(5), ConferenceType::Text, &[0u8; 16]);

        assert!(!state.is_degraded());
        let invite = state.events().unwrap().conference_invite(0);
        assert_eq!(invite.friend_number(), FriendNumber(5));
        assert!(!invite.has_cookie());
    }

    #[test]
    fn test_escalated_payload_failure() {
        let mut state = EventsState::new(tight_payload_config(PayloadFailurePolicy::Escalate));
        state.handle_conference_invite(FriendNumber(5), ConferenceType::Text, &[0u8; 16]);

        assert_eq!(state.error(), Some(IterateError::Malloc));
        let invite = state.events().unwrap().conference_invite(0);
        assert_eq!(invite.friend_number(), FriendNumber(5));
        assert!(!invite.has_cookie());
    }

    #[test]
    fn test_finish_soft_keeps_events() {
        let mut state = EventsState::new(EventsConfig::default().with_max_records(1));
        state.handle_conference_invite(FriendNumber(1), ConferenceType::Text, b"a");
        state.handle_conference_invite(FriendNumber(2), ConferenceType::Text, b"b");

        let iteration = state.finish(false);
        assert_eq!(iteration.error, Some(IterateError::Malloc));
        assert_eq!(iteration.events.unwrap().size(), 1);

        assert!(state.events().is_none());
        assert!(!state.is_degraded());
    }

    #[test]
    fn test_finish_hard_discards_events() {
        let iteration = EventsState::iterate(EventsConfig::default().with_max_records(0), true, |state| {
            state.handle_conference_invite(FriendNumber(1), ConferenceType::Text, b"a");
        });
        assert!(iteration.events.is_none());
        assert!(matches!(
            iteration.into_result(),
            Err(EventsError::Iterate(IterateError::Malloc))
        ));
    }

    #[test]
    fn test_iterate_without_events() {
        let iteration = EventsState::iterate(EventsConfig::default(), true, |_| {});
        assert!(iteration.error.is_none());
        assert!(iteration.into_result().unwrap().is_none());
    }

    #[test]
    fn test_callbacks_trait_dispatch() {
        fn deliver(callbacks: &mut dyn ToxCallbacks) {
            callbacks.on_conference_invite(FriendNumber(9), ConferenceType::Av, b"cookie");
        }

        let mut state = EventsState::default();
        deliver(&mut state);
        let invite = state.events().unwrap().conference_invite(0);
        assert_eq!(invite.friend_number(), FriendNumber(9));
        assert_eq!(invite.cookie(), b"cookie");
    }
}
