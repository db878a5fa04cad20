//! Audit log records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use cloudvault_core::events::DomainEvent;
use cloudvault_core::types::AuditLogId;

/// One persisted audit entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    /// Entry ID.
    pub id: AuditLogId,
    /// Tenant the action happened in.
    pub tenant_id: Option<Uuid>,
    /// Acting principal, `None` for anonymous share recipients.
    pub actor_id: Option<Uuid>,
    /// Dotted action name, e.g. `share.downloaded`.
    pub action: String,
    /// Resource type.
    pub resource_type: String,
    /// Resource ID.
    pub resource_id: Uuid,
    /// Full event payload.
    pub details: serde_json::Value,
    /// When the event happened.
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    /// Flatten a domain event into an audit record.
    pub fn from_event(event: &DomainEvent) -> Result<Self, cloudvault_core::AppError> {
        let (resource_type, resource_id) = event.payload.resource();
        Ok(Self {
            id: AuditLogId::from_uuid(event.id),
            tenant_id: event.tenant_id,
            actor_id: event.actor_id,
            action: event.payload.action(),
            resource_type: resource_type.to_string(),
            resource_id,
            details: serde_json::to_value(&event.payload)?,
            created_at: event.timestamp,
        })
    }
}
