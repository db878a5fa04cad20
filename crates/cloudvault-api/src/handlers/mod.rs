//! Request handlers, one module per area.

pub mod admin;
pub mod bucket;
pub mod file;
pub mod health;
pub mod multipart;
pub mod presign;
pub mod public_share;
pub mod share;
