//! Audit event recording.

use std::sync::Arc;

use tracing::warn;

use cloudvault_core::events::DomainEvent;
use cloudvault_core::traits::AuditSink;

/// Hands domain events to the audit sink.
///
/// A failing sink is logged and never fails the operation being audited.
#[derive(Debug, Clone)]
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
}

impl AuditRecorder {
    /// Creates a recorder over `sink`.
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Record one event.
    pub async fn record(&self, event: DomainEvent) {
        if let Err(e) = self.sink.record(&event).await {
            warn!(
                event_id = %event.id,
                action = %event.payload.action(),
                error = %e,
                "Failed to record audit event"
            );
        }
    }
}
