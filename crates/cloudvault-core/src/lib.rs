//! # cloudvault-core
//!
//! Core crate for CloudVault. Contains the collaborator traits (object
//! store, notification sink, audit sink), configuration schemas, typed
//! identifiers, domain events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other CloudVault crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
