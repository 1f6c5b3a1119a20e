//! Conference invite event
//!
//! Recorded when a friend invites us to a conference. The cookie is an
//! opaque blob that must be handed back to join the conference.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use tox_events_core::{Allocator, EventLogError, Payload, Record};

/// Friend list index of a peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct FriendNumber(pub u32);

impl FriendNumber {
    /// Get the underlying index
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Display for FriendNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FriendNumber {
    fn from(number: u32) -> Self {
        Self(number)
    }
}

/// Kind of conference being offered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConferenceType {
    /// Text-only conference
    #[default]
    Text,
    /// Audio/video conference
    Av,
}

impl ConferenceType {
    /// Wire value of this type
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Text => 0,
            Self::Av => 1,
        }
    }

    /// Parse a wire value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Text),
            1 => Some(Self::Av),
            _ => None,
        }
    }
}

impl Display for ConferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Av => write!(f, "av"),
        }
    }
}

/// A conference invite received from a friend
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ConferenceInvite {
    friend_number: FriendNumber,
    conference_type: ConferenceType,
    cookie: Payload,
}

impl ConferenceInvite {
    pub fn set_friend_number(&mut self, friend_number: FriendNumber) {
        self.friend_number = friend_number;
    }

    /// Friend who sent the invite
    pub fn friend_number(&self) -> FriendNumber {
        self.friend_number
    }

    pub fn set_conference_type(&mut self, conference_type: ConferenceType) {
        self.conference_type = conference_type;
    }

    /// Type of the offered conference
    pub fn conference_type(&self) -> ConferenceType {
        self.conference_type
    }

    /// Copy `cookie` in, replacing any previous cookie.
    ///
    /// On failure the invite is left without a cookie.
    pub fn set_cookie(&mut self, cookie: &[u8], allocator: &Allocator) -> Result<(), EventLogError> {
        self.cookie.assign(cookie, allocator)
    }

    /// Join cookie bytes (empty if none was stored)
    pub fn cookie(&self) -> &[u8] {
        self.cookie.as_slice()
    }

    pub fn cookie_length(&self) -> usize {
        self.cookie.len()
    }

    /// Whether a cookie copy-in has succeeded for this invite
    pub fn has_cookie(&self) -> bool {
        self.cookie.is_present()
    }

    /// Short display form of the cookie (first 4 bytes as hex)
    pub fn cookie_short(&self) -> String {
        let cookie = self.cookie();
        hex::encode(&cookie[..cookie.len().min(4)])
    }
}

impl Record for ConferenceInvite {
    const KIND: &'static str = "conference_invite";

    fn payload_len(&self) -> usize {
        self.cookie.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tox_events_core::MemoryBudget;

    #[test]
    fn test_default_invite_is_empty() {
        let invite = ConferenceInvite::default();
        assert_eq!(invite.friend_number(), FriendNumber(0));
        assert_eq!(invite.conference_type(), ConferenceType::Text);
        assert_eq!(invite.cookie_length(), 0);
        assert!(!invite.has_cookie());
    }

    #[test]
    fn test_header_setters() {
        let mut invite = ConferenceInvite::default();
        invite.set_friend_number(FriendNumber(7));
        invite.set_conference_type(ConferenceType::Av);
        assert_eq!(invite.friend_number().get(), 7);
        assert_eq!(invite.conference_type(), ConferenceType::Av);
    }

    #[test]
    fn test_cookie_replace() {
        let allocator = Allocator::unbounded();
        let mut invite = ConferenceInvite::default();
        invite.set_cookie(&[1, 2, 3, 4, 5], &allocator).unwrap();
        invite.set_cookie(&[9], &allocator).unwrap();
        assert_eq!(invite.cookie(), &[9]);
        assert_eq!(invite.payload_len(), 1);
    }

    #[test]
    fn test_cookie_failure_leaves_no_cookie() {
        let allocator = Allocator::with_budget(MemoryBudget {
            max_heap_bytes: 1024,
            max_payload_size: 2,
        });
        let mut invite = ConferenceInvite::default();
        invite.set_cookie(&[1, 2], &allocator).unwrap();
        assert!(invite.set_cookie(&[1, 2, 3], &allocator).is_err());
        assert!(!invite.has_cookie());
        assert_eq!(invite.cookie(), &[] as &[u8]);
    }

    #[test]
    fn test_cookie_short() {
        let mut invite = ConferenceInvite::default();
        assert_eq!(invite.cookie_short(), "");
        invite
            .set_cookie(&[0xDE, 0xAD, 0xBE, 0xEF, 0x01], &Allocator::unbounded())
            .unwrap();
        assert_eq!(invite.cookie_short(), "deadbeef");
    }

    #[test]
    fn test_conference_type_wire_values() {
        assert_eq!(ConferenceType::from_u8(ConferenceType::Av.as_u8()), Some(ConferenceType::Av));
        assert_eq!(ConferenceType::from_u8(0), Some(ConferenceType::Text));
        assert_eq!(ConferenceType::from_u8(2), None);
        assert_eq!(format!("{}", ConferenceType::Av), "av");
    }
}
