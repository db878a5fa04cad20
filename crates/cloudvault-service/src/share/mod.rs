//! Share lifecycle: owners create, list, and revoke; recipients view,
//! authenticate, and download.

pub mod access;
pub mod service;

pub use access::ShareAccessService;
pub use service::ShareService;
