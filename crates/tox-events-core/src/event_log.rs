//! Append-only event log
//!
//! [`EventLog`] is a growable, indexable sequence of records of one kind.
//!
//! ## Growth
//!
//! When full, the backing store grows from `c` to `2c + 1` slots
//! (0, 1, 3, 7, 15, ...). Growth is fallible: a refused or failed allocation
//! returns an error and leaves size, capacity and contents unchanged.
//!
//! ## Lifetime
//!
//! Records are only destroyed by [`EventLog::clear`], which drops them in
//! index order and frees the backing store.

use std::ops::{Deref, DerefMut};

use tracing::{debug, trace};

use crate::error::{AllocError, EventLogError};
use crate::memory::{Allocator, Reservation};
use crate::record::Record;

/// Growable log of records of type `T`
#[derive(Debug)]
pub struct EventLog<T: Record> {
    records: Vec<T>,
    capacity: u32,
    max_records: u32,
    allocator: Allocator,
    backing: Reservation,
}

impl<T: Record> Default for EventLog<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Capacity after one growth step: `2c + 1`, saturating at `u32::MAX`
fn next_capacity(capacity: u32) -> u32 {
    capacity.saturating_mul(2).saturating_add(1)
}

impl<T: Record> EventLog<T> {
    /// Create an empty, unbudgeted log
    pub fn new() -> Self {
        Self::with_allocator(Allocator::unbounded())
    }

    /// Create an empty log charging `allocator`
    pub fn with_allocator(allocator: Allocator) -> Self {
        Self {
            records: Vec::new(),
            capacity: 0,
            max_records: u32::MAX,
            allocator,
            backing: Reservation::default(),
        }
    }

    /// Lower the record ceiling (default `u32::MAX`)
    pub fn with_max_records(mut self, max_records: u32) -> Self {
        self.max_records = max_records;
        self
    }

    /// Append an empty record and return its index.
    ///
    /// Fails with [`EventLogError::CountExhausted`] before allocating when
    /// the ceiling is reached, or with [`EventLogError::AllocationFailure`]
    /// when growth is refused. The log is unchanged on failure.
    pub fn append(&mut self) -> Result<u32, EventLogError> {
        let size = self.size();
        debug_assert!(size <= self.capacity);

        if size >= self.max_records {
            return Err(EventLogError::CountExhausted {
                limit: self.max_records,
            });
        }

        if size == self.capacity {
            self.grow()?;
        }

        self.records.push(T::default());
        Ok(size)
    }

    fn grow(&mut self) -> Result<(), EventLogError> {
        let new_capacity = next_capacity(self.capacity);
        let additional = (new_capacity - self.capacity) as usize;
        let bytes = additional
            .checked_mul(size_of::<T>())
            .ok_or(AllocError::OutOfMemory {
                requested: usize::MAX,
            })?;

        let reservation = self.allocator.reserve(bytes)?;
        self.records
            .try_reserve_exact(additional)
            .map_err(|_| AllocError::OutOfMemory { requested: bytes })?;
        self.backing.merge(reservation);

        trace!(
            kind = T::KIND,
            from = self.capacity,
            to = new_capacity,
            "Grew event log"
        );
        self.capacity = new_capacity;
        Ok(())
    }

    /// Borrow the record at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.size()`.
    pub fn get(&self, index: u32) -> &T {
        assert!(
            index < self.size(),
            "{} index {} out of range for size {}",
            T::KIND,
            index,
            self.size()
        );
        &self.records[index as usize]
    }

    /// Borrow the record at `index`, `None` if out of range
    pub fn try_get(&self, index: u32) -> Option<&T> {
        self.records.get(index as usize)
    }

    /// Mutable access to the record at `index` for field population.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.size()`.
    pub fn entry(&mut self, index: u32) -> Entry<'_, T> {
        let size = self.size();
        assert!(
            index < size,
            "{} index {} out of range for size {}",
            T::KIND,
            index,
            size
        );
        Entry {
            record: &mut self.records[index as usize],
            allocator: &self.allocator,
        }
    }

    /// Number of live records
    pub fn size(&self) -> u32 {
        self.records.len() as u32
    }

    /// Number of allocated slots
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Record ceiling for this log
    pub fn max_records(&self) -> u32 {
        self.max_records
    }

    /// True if no records are live
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total payload bytes owned by live records
    pub fn payload_bytes(&self) -> usize {
        self.records.iter().map(Record::payload_len).sum()
    }

    /// The allocator payloads of this log are charged to
    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    /// Iterate records in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    /// Drop every record and free the backing store.
    ///
    /// Calling this on an empty log is a no-op.
    pub fn clear(&mut self) {
        if self.capacity == 0 {
            return;
        }

        let released = self.records.len();
        // Vec drops its elements front to back
        drop(std::mem::take(&mut self.records));
        self.backing = Reservation::default();
        self.capacity = 0;

        debug!(kind = T::KIND, released, "Cleared event log");
    }
}

impl<'a, T: Record> IntoIterator for &'a EventLog<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Mutable handle to a freshly appended record.
///
/// Derefs to the record for header setters. [`Entry::into_parts`] also
/// yields the log's allocator for payload copy-in.
#[derive(Debug)]
pub struct Entry<'a, T> {
    record: &'a mut T,
    allocator: &'a Allocator,
}

impl<'a, T> Entry<'a, T> {
    /// The allocator payloads must be charged to
    pub fn allocator(&self) -> &Allocator {
        self.allocator
    }

    /// Split into the record and its allocator
    pub fn into_parts(self) -> (&'a mut T, &'a Allocator) {
        (self.record, self.allocator)
    }
}

impl<T> Deref for Entry<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.record
    }
}

impl<T> DerefMut for Entry<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.record
    }
}
