//! Page header format.
//!
//! Every page starts with a 5-byte header.
//!
//! # Header Layout (5 bytes)
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//!   0       1   item_count (directory entries, including tombstoned)
//!   1       4   next_slot_id (u32, big-endian, monotonic)
//! ```
//!
//! `next_slot_id` is the only authority for ID assignment. It is never
//! recomputed from the directory: that would reissue the IDs of deleted
//! slots and break their uniqueness.

use bytes::{Buf, BufMut};

use stratum_common::constants::PAGE_HEADER_SIZE;
use stratum_common::types::SlotId;

use super::error::PageResult;
use crate::file::ReadAt;

/// Page header (5 bytes).
///
/// A zeroed frame decodes to an empty header, so a freshly created page
/// file of 4000 zero bytes is already a valid empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageHeader {
    /// Number of directory entries, including tombstoned ones.
    pub item_count: u8,
    /// The next slot ID to assign; greater than every ID in the directory.
    pub next_slot_id: SlotId,
}

impl PageHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = PAGE_HEADER_SIZE;

    /// Creates a header.
    pub fn new(item_count: u8, next_slot_id: SlotId) -> Self {
        Self {
            item_count,
            next_slot_id,
        }
    }

    /// Serializes the header.
    pub fn serialize(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.item_count);
        buf.put_u32(self.next_slot_id.as_u32());
    }

    /// Serializes the header to a byte array.
    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        let mut cursor = &mut buf[..];
        self.serialize(&mut cursor);
        buf
    }

    /// Deserializes a header.
    ///
    /// The caller must supply at least [`Self::SIZE`] bytes.
    pub fn deserialize(buf: &mut impl Buf) -> Self {
        let item_count = buf.get_u8();
        let next_slot_id = SlotId::new(buf.get_u32());
        Self {
            item_count,
            next_slot_id,
        }
    }

    /// Reads the header from the start of a positional byte source.
    pub async fn load<S: ReadAt + ?Sized>(src: &S) -> PageResult<Self> {
        let mut bytes = [0u8; Self::SIZE];
        src.read_exact_at(&mut bytes, 0).await?;
        Ok(Self::deserialize(&mut &bytes[..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size() {
        assert_eq!(PageHeader::SIZE, 5);
    }

    #[test]
    fn test_header_roundtrip() {
        let header = PageHeader::new(3, SlotId::new(17));
        let bytes = header.to_bytes();
        assert_eq!(bytes, [3, 0, 0, 0, 17]);

        let decoded = PageHeader::deserialize(&mut &bytes[..]);
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_zeroed_header_is_empty() {
        let header = PageHeader::deserialize(&mut &[0u8; 5][..]);
        assert_eq!(header.item_count, 0);
        assert_eq!(header.next_slot_id, SlotId::FIRST);
        assert_eq!(header, PageHeader::default());
    }

    #[tokio::test]
    async fn test_load_from_slice() {
        let mut frame = vec![0u8; 4000];
        frame[0] = 2;
        frame[1..5].copy_from_slice(&SlotId::new(9).to_be_bytes());

        let header = PageHeader::load(&frame[..]).await.unwrap();
        assert_eq!(header.item_count, 2);
        assert_eq!(header.next_slot_id, SlotId::new(9));
    }
}
