//! Fire-and-forget email delivery.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use cloudvault_core::traits::{NotificationSink, OutboundEmail};

/// Sends email on a background task.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationDispatcher {
    /// Creates a dispatcher over `sink`.
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Queue `email` for delivery and return immediately.
    ///
    /// The handle resolves once the sink has answered; callers are free to
    /// drop it. Delivery errors are logged, never returned.
    pub fn dispatch(&self, email: OutboundEmail) -> JoinHandle<()> {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            let to = email.to.clone();
            let kind = email.kind;
            match sink.send(email).await {
                Ok(()) => debug!(to = %to, kind = ?kind, "Email delivered"),
                Err(e) => warn!(to = %to, kind = ?kind, error = %e, "Email delivery failed"),
            }
        })
    }
}
