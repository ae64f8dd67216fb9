//! Core types for Stratum.

mod ids;

pub use ids::SlotId;
