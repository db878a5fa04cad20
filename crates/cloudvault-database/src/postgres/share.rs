//! Share store on PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use cloudvault_core::result::AppResult;
use cloudvault_core::types::{ShareId, UserId};
use cloudvault_entity::share::Share;

use super::db_error;
use crate::store::ShareStore;

/// Share records in the `shares` table.
#[derive(Debug, Clone)]
pub struct PgShareStore {
    pool: PgPool,
}

impl PgShareStore {
    /// Create a new share store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareStore for PgShareStore {
    async fn insert(&self, share: &Share) -> AppResult<Share> {
        sqlx::query_as::<_, Share>(
            "INSERT INTO shares (id, file_id, tenant_id, created_by, to_email, expires_at, \
             download_limit, downloads, password_hash, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
        )
        .bind(share.id)
        .bind(share.file_id)
        .bind(share.tenant_id)
        .bind(share.created_by)
        .bind(&share.to_email)
        .bind(share.expires_at)
        .bind(share.download_limit)
        .bind(share.downloads)
        .bind(&share.password_hash)
        .bind(share.status)
        .bind(share.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create share"))
    }

    async fn find_by_id(&self, id: ShareId) -> AppResult<Option<Share>> {
        sqlx::query_as::<_, Share>("SELECT * FROM shares WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find share"))
    }

    async fn list_by_creator(&self, user_id: UserId) -> AppResult<Vec<Share>> {
        sqlx::query_as::<_, Share>(
            "SELECT * FROM shares WHERE created_by = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list shares"))
    }

    async fn expire_if_active(&self, id: ShareId) -> AppResult<Option<Share>> {
        sqlx::query_as::<_, Share>(
            "UPDATE shares SET status = 'EXPIRED' \
             WHERE id = $1 AND status = 'ACTIVE' RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to expire share"))
    }

    async fn try_consume_download(
        &self,
        id: ShareId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Share>> {
        sqlx::query_as::<_, Share>(
            "UPDATE shares SET \
                downloads = downloads + 1, \
                last_accessed_at = $2, \
                status = CASE WHEN downloads + 1 >= download_limit \
                              THEN 'EXPIRED'::share_status ELSE status END \
             WHERE id = $1 AND status = 'ACTIVE' \
               AND downloads < download_limit AND expires_at >= $2 \
             RETURNING *",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to record share download"))
    }

    async fn revoke_if_active(&self, id: ShareId, now: DateTime<Utc>) -> AppResult<Option<Share>> {
        sqlx::query_as::<_, Share>(
            "UPDATE shares SET status = 'REVOKED', revoked_at = $2 \
             WHERE id = $1 AND status = 'ACTIVE' RETURNING *",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to revoke share"))
    }

    async fn consume_token(
        &self,
        jti: Uuid,
        share_id: ShareId,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO consumed_share_tokens (jti, share_id, expires_at) \
             VALUES ($1, $2, $3) ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(share_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to record magic link use"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn purge_consumed_tokens(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM consumed_share_tokens WHERE expires_at < $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to purge used magic links"))?;
        Ok(result.rows_affected())
    }
}
