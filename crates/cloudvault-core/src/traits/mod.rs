//! Collaborator traits defined in `cloudvault-core` and implemented by
//! other crates.

pub mod audit;
pub mod notification;
pub mod object_store;

pub use audit::AuditSink;
pub use notification::{EmailKind, NotificationSink, OutboundEmail};
pub use object_store::{ObjectInfo, ObjectPage, ObjectStore, PresignedUrl};
