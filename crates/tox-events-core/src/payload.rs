//! Owned variable-length payloads
//!
//! A [`Payload`] is a separate heap buffer referenced by its record, so
//! records can be moved freely when the log's backing store grows.

use std::fmt;

use crate::error::{AllocError, EventLogError};
use crate::memory::{Allocator, Reservation};

/// Owned byte buffer held by a record.
///
/// A payload is either absent (the default, no allocation) or present with
/// a length that may be zero. Buffer and length always change together.
#[derive(Default)]
pub struct Payload {
    bytes: Option<Vec<u8>>,
    reservation: Reservation,
}

impl Payload {
    /// An absent payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `src` into this payload, replacing any previous contents.
    ///
    /// The old buffer is freed first. On failure the payload is left absent.
    pub fn assign(&mut self, src: &[u8], allocator: &Allocator) -> Result<(), EventLogError> {
        self.release();

        let reservation = allocator.reserve_payload(src.len())?;

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(src.len())
            .map_err(|_| AllocError::OutOfMemory {
                requested: src.len(),
            })?;
        buffer.extend_from_slice(src);

        self.bytes = Some(buffer);
        self.reservation = reservation;
        Ok(())
    }

    /// Free the buffer and return to the absent state
    pub fn release(&mut self) {
        self.bytes = None;
        self.reservation = Reservation::default();
    }

    /// Borrow the bytes, `None` if absent
    pub fn get(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    /// Borrow the bytes, empty if absent
    pub fn as_slice(&self) -> &[u8] {
        self.bytes.as_deref().unwrap_or(&[])
    }

    /// Payload length in bytes (0 if absent)
    pub fn len(&self) -> usize {
        self.bytes.as_ref().map_or(0, Vec::len)
    }

    /// True if absent or zero-length
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once a copy-in has succeeded
    pub fn is_present(&self) -> bool {
        self.bytes.is_some()
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Payload {}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bytes {
            None => write!(f, "Payload(absent)"),
            Some(bytes) => write!(f, "Payload({} bytes)", bytes.len()),
        }
    }
}

impl AsRef<[u8]> for Payload {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
