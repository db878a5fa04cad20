//! Audit sink on PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use cloudvault_core::events::DomainEvent;
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::AuditSink;
use cloudvault_entity::audit::AuditLog;

use super::db_error;

/// Writes domain events to the `audit_logs` table.
#[derive(Debug, Clone)]
pub struct PgAuditStore {
    pool: PgPool,
}

impl PgAuditStore {
    /// Create a new audit store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditStore {
    async fn record(&self, event: &DomainEvent) -> AppResult<()> {
        let entry = AuditLog::from_event(event)?;
        sqlx::query(
            "INSERT INTO audit_logs (id, tenant_id, actor_id, action, resource_type, \
             resource_id, details, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(entry.id)
        .bind(entry.tenant_id)
        .bind(entry.actor_id)
        .bind(&entry.action)
        .bind(&entry.resource_type)
        .bind(entry.resource_id)
        .bind(&entry.details)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to write audit log"))?;
        Ok(())
    }
}
