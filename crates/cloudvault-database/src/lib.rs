//! # cloudvault-database
//!
//! Metadata persistence for CloudVault: store traits consumed by the
//! services, PostgreSQL implementations, and an in-memory implementation
//! for development and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{BucketStore, FileStore, PrincipalStore, ShareStore};
