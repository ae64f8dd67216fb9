//! Slot directory entries.
//!
//! The directory starts right after the page header and grows toward the
//! record heap. Each entry is 9 bytes:
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//!   0       2   record offset (u16, big-endian, absolute within frame)
//!   2       2   record size (u16, big-endian)
//!   4       4   slot id (u32, big-endian)
//!   8       1   tombstone (0 = live, 1 = deleted)
//! ```

use std::cmp::Ordering;

use bytes::{Buf, BufMut};

use stratum_common::constants::{PAGE_HEADER_SIZE, SLOT_SIZE};
use stratum_common::types::SlotId;

use super::error::PageResult;
use crate::file::ReadAt;

/// A slot directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotEntry {
    /// Absolute byte offset of the record payload within the frame.
    pub offset: u16,
    /// Payload length in bytes.
    pub size: u16,
    /// Stable record identity, assigned at insertion.
    pub id: SlotId,
    /// Whether the record has been deleted.
    pub tombstone: bool,
}

impl SlotEntry {
    /// Size of one entry in bytes.
    pub const SIZE: usize = SLOT_SIZE;

    /// Byte position of the tombstone flag within an entry.
    pub const TOMBSTONE_OFFSET: usize = 8;

    /// Byte position of the size field within an entry.
    pub const SIZE_FIELD_OFFSET: usize = 2;

    /// Creates a live entry.
    pub fn new(offset: u16, size: u16, id: SlotId) -> Self {
        Self {
            offset,
            size,
            id,
            tombstone: false,
        }
    }

    /// Returns true if the record has not been deleted.
    #[inline]
    pub fn is_live(&self) -> bool {
        !self.tombstone
    }

    /// One past the last payload byte.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset as usize + self.size as usize
    }

    /// Serializes the entry.
    pub fn serialize(&self, buf: &mut impl BufMut) {
        buf.put_u16(self.offset);
        buf.put_u16(self.size);
        buf.put_u32(self.id.as_u32());
        buf.put_u8(u8::from(self.tombstone));
    }

    /// Serializes the entry to a byte array.
    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        let mut cursor = &mut buf[..];
        self.serialize(&mut cursor);
        buf
    }

    /// Deserializes an entry.
    ///
    /// The caller must supply at least [`Self::SIZE`] bytes.
    pub fn deserialize(buf: &mut impl Buf) -> Self {
        let offset = buf.get_u16();
        let size = buf.get_u16();
        let id = SlotId::new(buf.get_u32());
        let tombstone = buf.get_u8() != 0;
        Self {
            offset,
            size,
            id,
            tombstone,
        }
    }
}

/// Byte position of a directory entry within the frame.
#[inline]
pub(crate) fn entry_offset(index: usize) -> usize {
    PAGE_HEADER_SIZE + index * SLOT_SIZE
}

/// Byte position of an entry's tombstone flag within the frame.
#[inline]
pub(crate) fn tombstone_byte_offset(index: usize) -> usize {
    entry_offset(index) + SlotEntry::TOMBSTONE_OFFSET
}

/// Byte position of an entry's size field within the frame.
#[inline]
pub(crate) fn size_field_offset(index: usize) -> usize {
    entry_offset(index) + SlotEntry::SIZE_FIELD_OFFSET
}

/// Reads `count` directory entries from a positional byte source.
pub async fn load_directory<S: ReadAt + ?Sized>(src: &S, count: u8) -> PageResult<Vec<SlotEntry>> {
    let mut entries = Vec::with_capacity(count as usize);
    let mut bytes = [0u8; SlotEntry::SIZE];
    for index in 0..count as usize {
        src.read_exact_at(&mut bytes, entry_offset(index) as u64)
            .await?;
        entries.push(SlotEntry::deserialize(&mut &bytes[..]));
    }
    Ok(entries)
}

/// Binary search over a directory sorted ascending by slot ID.
///
/// Returns the directory index of the matching entry, or `None`. The
/// sorted precondition holds for every page this crate writes: appends
/// assign monotonically increasing IDs and compaction preserves order.
pub fn find_by_id(entries: &[SlotEntry], id: SlotId) -> Option<usize> {
    let mut lo = 0;
    let mut hi = entries.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match entries[mid].id.cmp(&id) {
            Ordering::Equal => return Some(mid),
            Ordering::Less => lo = mid + 1,
            Ordering::Greater => hi = mid,
        }
    }
    None
}
