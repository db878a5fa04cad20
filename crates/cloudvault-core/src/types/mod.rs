//! Shared value types used across crate boundaries.

pub mod id;
pub mod part;

pub use id::*;
pub use part::CompletedPart;
