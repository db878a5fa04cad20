//! Response bodies owned by the HTTP layer.
//!
//! Request and response bodies shared with the transfer client live in
//! `cloudvault_entity::wire`.

pub mod response;

pub use response::{ApiResponse, HealthResponse, MessageResponse};
