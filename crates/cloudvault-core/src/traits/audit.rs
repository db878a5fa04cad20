//! Audit trail sink.

use async_trait::async_trait;

use crate::events::DomainEvent;
use crate::result::AppResult;

/// Persists domain events as audit records.
#[async_trait]
pub trait AuditSink: Send + Sync + std::fmt::Debug + 'static {
    /// Record one event.
    async fn record(&self, event: &DomainEvent) -> AppResult<()>;
}
