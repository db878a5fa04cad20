//! Outbound email dispatch.

pub mod dispatcher;
pub mod sinks;

pub use dispatcher::NotificationDispatcher;
pub use sinks::{LogNotificationSink, MemoryNotificationSink};
