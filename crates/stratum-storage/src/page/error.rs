//! Page codec error types.

use thiserror::Error;

use stratum_common::types::SlotId;

use crate::file::IoError;

/// Result type for page codec operations.
pub type PageResult<T> = Result<T, PageError>;

/// Errors that can occur while encoding, parsing, or rewriting a page.
#[derive(Debug, Error)]
pub enum PageError {
    /// I/O error while reading from the underlying byte source.
    #[error("page I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: IoError,
    },

    /// The byte buffer is not a whole page frame.
    #[error("page frame must be {expected} bytes, got {actual}")]
    BadFrame {
        /// Expected frame length.
        expected: usize,
        /// Actual buffer length.
        actual: usize,
    },

    /// More records than a single page can index.
    #[error("too many records for one page: {count} exceeds {max}")]
    TooManyRecords {
        /// Number of records offered.
        count: usize,
        /// Directory capacity of a page.
        max: usize,
    },

    /// The records' combined footprint exceeds the page frame.
    #[error("records overflow the page frame: need {required} bytes, capacity {capacity}")]
    Overflow {
        /// Bytes required by header, directory, and payloads.
        required: usize,
        /// The frame capacity.
        capacity: usize,
    },

    /// No directory entry carries the requested slot ID.
    #[error("no such slot in page: {id}")]
    SlotNotFound {
        /// The slot ID that was looked up.
        id: SlotId,
    },
}

impl PageError {
    /// Creates a TooManyRecords error.
    pub fn too_many_records(count: usize) -> Self {
        Self::TooManyRecords {
            count,
            max: stratum_common::constants::MAX_PAGE_RECORDS,
        }
    }

    /// Creates an Overflow error.
    pub fn overflow(required: usize) -> Self {
        Self::Overflow {
            required,
            capacity: stratum_common::constants::PAGE_SIZE,
        }
    }

    /// Creates a SlotNotFound error.
    pub fn slot_not_found(id: SlotId) -> Self {
        Self::SlotNotFound { id }
    }

    /// Returns true if this is a slot-not-found error.
    pub fn is_slot_not_found(&self) -> bool {
        matches!(self, Self::SlotNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PageError::slot_not_found(SlotId::new(9));
        assert!(err.is_slot_not_found());
        assert!(format!("{}", err).contains("no such slot in page: 9"));

        let err = PageError::too_many_records(300);
        let msg = format!("{}", err);
        assert!(msg.contains("300"));
        assert!(msg.contains("255"));

        let err = PageError::overflow(5000);
        let msg = format!("{}", err);
        assert!(msg.contains("5000"));
        assert!(msg.contains("4000"));
    }
}
