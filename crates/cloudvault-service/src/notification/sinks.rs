//! Built-in notification sinks.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use cloudvault_core::result::AppResult;
use cloudvault_core::traits::{NotificationSink, OutboundEmail};

/// Writes emails to the log instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn send(&self, email: OutboundEmail) -> AppResult<()> {
        info!(
            to = %email.to,
            kind = ?email.kind,
            subject = %email.subject,
            body = %email.body,
            "Outbound email"
        );
        Ok(())
    }
}

/// Keeps every email in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotificationSink {
    outbox: Arc<Mutex<Vec<OutboundEmail>>>,
}

impl MemoryNotificationSink {
    /// Creates an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emails sent so far, oldest first.
    pub async fn sent(&self) -> Vec<OutboundEmail> {
        self.outbox.lock().await.clone()
    }
}

#[async_trait]
impl NotificationSink for MemoryNotificationSink {
    async fn send(&self, email: OutboundEmail) -> AppResult<()> {
        self.outbox.lock().await.push(email);
        Ok(())
    }
}
