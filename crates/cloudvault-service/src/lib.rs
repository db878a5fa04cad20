//! # cloudvault-service
//!
//! Business logic for CloudVault. Each service checks the caller against
//! the policy engine, then drives the metadata stores and the object store.
//!
//! Services follow constructor injection: every collaborator is handed in
//! as an `Arc` when the service is built.

pub mod audit;
pub mod context;
pub mod notification;
pub mod principal;
pub mod share;
pub mod storage;

pub use audit::AuditRecorder;
pub use context::RequestContext;
pub use notification::{LogNotificationSink, MemoryNotificationSink, NotificationDispatcher};
pub use principal::{AccessAdminService, PrincipalService};
pub use share::{ShareAccessService, ShareService};
pub use storage::{FileService, MultipartService, PresignService};

#[cfg(test)]
pub(crate) mod test_support;
