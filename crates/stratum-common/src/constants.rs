//! System-wide constants for Stratum.
//!
//! These values define the on-disk page geometry. They are part of the
//! wire format: implementations in any language must agree on them
//! byte-for-byte.

// =============================================================================
// Page Geometry
// =============================================================================

/// Size of a page frame in bytes.
///
/// Every page file is exactly this long. The slot directory grows
/// rightward from the header while record payloads grow leftward from the
/// end of the frame.
pub const PAGE_SIZE: usize = 4000;

/// Page header size in bytes.
///
/// The header contains: item_count (1), next_slot_id (4) = 5 bytes.
pub const PAGE_HEADER_SIZE: usize = 5;

/// Size of one slot directory entry in bytes.
///
/// Each entry contains: record offset (2), record size (2), slot id (4),
/// tombstone flag (1) = 9 bytes.
pub const SLOT_SIZE: usize = 9;

// =============================================================================
// Limits
// =============================================================================

/// Maximum number of records (live or tombstoned) in a single page.
///
/// The item count is stored as a single byte.
pub const MAX_PAGE_RECORDS: usize = 255;

/// Maximum payload size for a single record.
///
/// A record must fit alongside the page header and its own directory
/// entry. Larger payloads are rejected, not spilled to overflow storage.
pub const MAX_RECORD_SIZE: usize = PAGE_SIZE - PAGE_HEADER_SIZE - SLOT_SIZE;
