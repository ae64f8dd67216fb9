//! # stratum-common
//!
//! Common types and constants for the Stratum storage engine.
//!
//! This crate provides the foundational pieces shared across Stratum
//! components:
//!
//! - **Types**: the `SlotId` record identifier
//! - **Constants**: page geometry and limits
//!
//! ## Example
//!
//! ```rust
//! use stratum_common::constants::PAGE_SIZE;
//! use stratum_common::types::SlotId;
//!
//! let slot = SlotId::new(42);
//! assert_eq!(slot.as_u32(), 42);
//! assert!(PAGE_SIZE > 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod types;

// Re-export commonly used items at the crate root
pub use constants::*;
pub use types::SlotId;
