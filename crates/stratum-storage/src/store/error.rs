//! Page store error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::file::IoError;
use crate::page::PageError;

/// Result type for page store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during page store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O failure from the file layer.
    #[error("store I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: IoError,
    },

    /// Codec failure from the page layer.
    #[error("{source}")]
    Page {
        /// The underlying page error.
        #[from]
        source: PageError,
    },

    /// The page file does not exist.
    #[error("page file not found: {path}")]
    PageNotFound {
        /// The resolved file path.
        path: PathBuf,
    },

    /// The record does not fit in the page's remaining free run.
    ///
    /// Tombstoned space is not reclaimed by this check; compact first to
    /// reuse deleted space.
    #[error("not enough space in page: record needs {required} bytes, {available} free")]
    InsufficientSpace {
        /// Bytes needed by the record.
        required: usize,
        /// Bytes free between the directory and the record heap.
        available: usize,
    },

    /// Invalid store configuration.
    #[error("store configuration error: {reason}")]
    Config {
        /// Why the configuration was rejected.
        reason: String,
    },
}

impl StoreError {
    /// Creates a PageNotFound error.
    pub fn page_not_found(path: impl Into<PathBuf>) -> Self {
        Self::PageNotFound { path: path.into() }
    }

    /// Creates an InsufficientSpace error.
    pub fn insufficient_space(required: usize, available: usize) -> Self {
        Self::InsufficientSpace {
            required,
            available,
        }
    }

    /// Creates a Config error.
    pub fn config_error(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Returns true if the page file was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PageNotFound { .. })
    }

    /// Returns true if a slot lookup failed.
    pub fn is_slot_not_found(&self) -> bool {
        matches!(self, Self::Page { source } if source.is_slot_not_found())
    }
}
