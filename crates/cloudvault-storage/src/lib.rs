//! # cloudvault-storage
//!
//! Object store providers for CloudVault. The in-memory provider backs
//! development and tests; the S3 provider (feature `s3`) talks to any
//! S3-compatible service.

pub mod keys;
pub mod manager;
pub mod providers;

pub use manager::build_object_store;
pub use providers::memory::MemoryObjectStore;
#[cfg(feature = "s3")]
pub use providers::s3::S3ObjectStore;
