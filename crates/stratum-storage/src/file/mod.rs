//! Positional file I/O layer for Stratum.
//!
//! This module provides an abstraction over position-based byte access:
//!
//! - [`ReadAt`]: a read-at-offset byte source, implemented for both plain
//!   byte slices and open files — page parsing is written once against
//!   this trait and works over either
//! - [`FileHandle`]: positional writes and durability on top of `ReadAt`
//! - [`StandardFile`]: the cross-platform backend, wrapping a standard
//!   file in tokio's `spawn_blocking`
//!
//! # Usage
//!
//! ```rust,no_run
//! use stratum_storage::file::{FileHandle, OpenOptions, ReadAt, StandardFile};
//!
//! async fn example() -> stratum_storage::file::IoResult<()> {
//!     let file = StandardFile::open("data.page", OpenOptions::for_create()).await?;
//!
//!     file.write_all_at(b"hello", 0).await?;
//!     file.sync().await?;
//!
//!     let mut buf = [0u8; 5];
//!     file.read_exact_at(&mut buf, 0).await?;
//!     Ok(())
//! }
//! ```

mod error;
mod handle;
mod options;
mod std_io;

pub use error::{IoError, IoResult};
pub use handle::{FileHandle, ReadAt};
pub use options::OpenOptions;
pub use std_io::StandardFile;
