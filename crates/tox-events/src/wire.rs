//! Snapshot encoding
//!
//! A snapshot is a postcard-encoded copy of a [`ToxEvents`] container.
//! Decoding replays every record through the normal append path, so record
//! ceilings and memory budgets from the target config still apply.

use serde::{Deserialize, Serialize};

use crate::config::EventsConfig;
use crate::conference_invite::{ConferenceType, FriendNumber};
use crate::error::{EventsError, EventsResult};
use crate::events::ToxEvents;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u8 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot<'a> {
    version: u8,
    #[serde(borrow)]
    conference_invite: Vec<ConferenceInviteWire<'a>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ConferenceInviteWire<'a> {
    friend_number: FriendNumber,
    conference_type: ConferenceType,
    #[serde(borrow)]
    cookie: Option<&'a [u8]>,
}

impl ToxEvents {
    /// Encode all events into a snapshot
    pub fn to_bytes(&self) -> EventsResult<Vec<u8>> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            conference_invite: self
                .conference_invites()
                .iter()
                .map(|invite| ConferenceInviteWire {
                    friend_number: invite.friend_number(),
                    conference_type: invite.conference_type(),
                    cookie: invite.has_cookie().then(|| invite.cookie()),
                })
                .collect(),
        };

        postcard::to_allocvec(&snapshot).map_err(|e| EventsError::encode(e.to_string()))
    }

    /// Decode a snapshot into a new container configured by `config`
    pub fn from_bytes(bytes: &[u8], config: &EventsConfig) -> EventsResult<Self> {
        let snapshot: Snapshot<'_> =
            postcard::from_bytes(bytes).map_err(|e| EventsError::decode(e.to_string()))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(EventsError::decode(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        let mut events = ToxEvents::with_config(config);
        for wire in &snapshot.conference_invite {
            let index = events.add_conference_invite()?;
            let (invite, allocator) = events.conference_invite_entry(index).into_parts();
            invite.set_friend_number(wire.friend_number);
            invite.set_conference_type(wire.conference_type);
            if let Some(cookie) = wire.cookie {
                invite.set_cookie(cookie, allocator)?;
            }
        }

        Ok(events)
    }
}
