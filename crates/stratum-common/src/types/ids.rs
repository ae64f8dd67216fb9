//! Core identifier types for Stratum.
//!
//! These types provide type-safe wrappers around numeric identifiers,
//! preventing accidental misuse of different ID types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Slot identifier - the stable identity of a record within a page.
///
/// Slot IDs are assigned monotonically from the page's own counter at
/// insertion time and are never reused, even after the record is deleted
/// and the page compacted. They survive physical reorganisation of the
/// page: compaction may move a record but never renumbers it.
///
/// # Example
///
/// ```rust
/// use stratum_common::types::SlotId;
///
/// let slot = SlotId::new(42);
/// assert_eq!(slot.as_u32(), 42);
/// assert_eq!(slot.next(), SlotId::new(43));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SlotId(u32);

impl SlotId {
    /// First slot ID assigned in a fresh page.
    pub const FIRST: Self = Self(0);

    /// Creates a new `SlotId` from a raw u32 value.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw u32 value.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the next slot ID.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Creates a SlotId from bytes (big-endian).
    #[inline]
    #[must_use]
    pub fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    /// Converts to bytes (big-endian).
    #[inline]
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl fmt::Debug for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotId({})", self.0)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SlotId {
    #[inline]
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

impl From<SlotId> for u32 {
    #[inline]
    fn from(id: SlotId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_id_basics() {
        let id = SlotId::new(7);
        assert_eq!(id.as_u32(), 7);
        assert_eq!(id.next(), SlotId::new(8));
        assert_eq!(SlotId::FIRST.as_u32(), 0);
        assert_eq!(SlotId::default(), SlotId::FIRST);
    }

    #[test]
    fn test_slot_id_ordering() {
        assert!(SlotId::new(1) < SlotId::new(2));
        assert_eq!(SlotId::new(5), SlotId::from(5u32));
        assert_eq!(u32::from(SlotId::new(5)), 5);
    }

    #[test]
    fn test_slot_id_bytes() {
        let id = SlotId::new(0x0102_0304);
        assert_eq!(id.to_be_bytes(), [1, 2, 3, 4]);
        assert_eq!(SlotId::from_be_bytes([1, 2, 3, 4]), id);
    }

    #[test]
    fn test_next_saturates() {
        let id = SlotId::new(u32::MAX);
        assert_eq!(id.next(), id);
    }
}
