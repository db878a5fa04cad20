//! # cloudvault-entity
//!
//! Domain entity models for CloudVault. Structs that map to a table row
//! derive `sqlx::FromRow`; the `wire` module holds the JSON request and
//! response bodies shared by the HTTP API and the transfer client.

pub mod audit;
pub mod bucket;
pub mod file;
pub mod permission;
pub mod principal;
pub mod share;
pub mod transfer;
pub mod wire;
