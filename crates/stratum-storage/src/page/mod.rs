//! Page layout and disk format for Stratum.
//!
//! This module implements the on-disk slotted-page format. All data is
//! organized into fixed 4000-byte frames that pack a variable number of
//! variable-length byte records, indexed by a directory of slots. All
//! integers are big-endian.
//!
//! # Page Format
//!
//! ```text
//! +------------------+
//! |   Page Header    |  5 bytes: item_count (1), next_slot_id (4)
//! +------------------+
//! |  Slot Directory  |  9 bytes per entry, grows downward
//! |        ↓         |  offset (2), size (2), slot_id (4), tombstone (1)
//! +------------------+
//! |   Free Space     |
//! +------------------+
//! |        ↑         |
//! |   Record Data    |  grows upward from the end of the frame
//! +------------------+
//! ```
//!
//! The slot directory and record data grow toward each other from
//! opposite ends of the frame. A record's slot ID is assigned from the
//! header's monotonic counter at insertion and never changes; deletion
//! tombstones the directory entry in place, and compaction evicts
//! tombstoned entries while preserving the surviving IDs and the counter.

mod error;
mod header;
mod slot;
mod slotted;

pub use error::{PageError, PageResult};
pub use header::PageHeader;
pub use slot::{find_by_id, load_directory, SlotEntry};
pub use slotted::{
    footprint, load_contents, load_record, Compaction, PageContents, SlotRecord, SlottedPage,
};

pub(crate) use slot::{entry_offset, size_field_offset, tombstone_byte_offset};
pub(crate) use slotted::pack;

pub use stratum_common::constants::{MAX_PAGE_RECORDS, PAGE_HEADER_SIZE, PAGE_SIZE, SLOT_SIZE};
