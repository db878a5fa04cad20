//! Principal resolution and access administration.

pub mod admin;
pub mod service;

pub use admin::AccessAdminService;
pub use service::PrincipalService;
